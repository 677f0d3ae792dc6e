//! Project configuration
//!
//! Three small pieces of configuration drive plugin metadata collection:
//!
//! - [`PathsConfig`] - where the project lives, what kind of project it is and which
//!   `ansible-doc` to run
//! - [`CollectionDetails`] - namespace, name and version of a collection, read from
//!   `galaxy.yml`
//! - [`ChangelogConfig`] - options from `changelogs/config.yaml` (copy strategy for
//!   staging, description punctuation)
//!
//! # Project detection
//!
//! | Marker file | Kind |
//! |---|---|
//! | `galaxy.yml` | [`ProjectKind::Collection`] |
//! | `lib/ansible/release.py` | [`ProjectKind::Core`] |
//! | neither | [`ProjectKind::Other`] |

mod changelog;
mod collection;

pub use changelog::{ChangelogConfig, VcsSetting};
pub use collection::CollectionDetails;

use std::path::{Path, PathBuf};

/// Name of the plugin cache file inside the changelog directory.
pub const PLUGIN_CACHE_FILENAME: &str = ".plugin-cache.yaml";

/// Default documentation tool, looked up on `PATH`.
pub const DEFAULT_ANSIBLE_DOC: &str = "ansible-doc";

/// The kind of project plugmeta is pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    /// An Ansible collection (has `galaxy.yml`)
    Collection,
    /// An ansible-core / ansible-base source checkout
    Core,
    /// Anything else; there are no plugins to enumerate
    Other,
}

/// Filesystem layout of the project being documented.
#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// Root of the project (collection root or ansible-core checkout)
    pub base_dir: PathBuf,
    /// Directory holding the changelog and the plugin cache
    pub changelog_dir: PathBuf,
    /// Detected or forced project kind
    pub kind: ProjectKind,
    /// The `ansible-doc` executable (name on `PATH` or explicit path)
    pub ansible_doc_path: PathBuf,
    /// Release string of the host ansible-core, when known without asking `ansible-doc`
    pub core_version: Option<String>,
}

impl PathsConfig {
    /// Creates a configuration with an explicit project kind.
    pub fn new(base_dir: impl Into<PathBuf>, kind: ProjectKind) -> Self {
        let base_dir = base_dir.into();
        Self {
            changelog_dir: base_dir.join("changelogs"),
            base_dir,
            kind,
            ansible_doc_path: PathBuf::from(DEFAULT_ANSIBLE_DOC),
            core_version: None,
        }
    }

    /// Detects the project kind from marker files in `base_dir`.
    pub fn detect(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let kind = if base_dir.join("galaxy.yml").is_file() {
            ProjectKind::Collection
        } else if base_dir.join("lib").join("ansible").join("release.py").is_file() {
            ProjectKind::Core
        } else {
            ProjectKind::Other
        };
        tracing::debug!(target: "config", "Detected project kind {:?} for {}", kind, base_dir.display());
        Self::new(base_dir, kind)
    }

    /// Builds a collection configuration for a staged copy at `collection_dir`,
    /// keeping the documentation tool of the original configuration.
    pub fn force_collection(collection_dir: impl Into<PathBuf>, ansible_doc_path: &Path) -> Self {
        Self::new(collection_dir, ProjectKind::Collection).with_ansible_doc(ansible_doc_path)
    }

    /// Overrides the documentation tool executable.
    #[must_use]
    pub fn with_ansible_doc(mut self, path: impl Into<PathBuf>) -> Self {
        self.ansible_doc_path = path.into();
        self
    }

    /// Records a known ansible-core release string.
    #[must_use]
    pub fn with_core_version(mut self, version: impl Into<String>) -> Self {
        self.core_version = Some(version.into());
        self
    }

    /// Returns `true` for collections.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.kind == ProjectKind::Collection
    }

    /// Returns `true` for projects that are neither a collection nor ansible-core.
    #[must_use]
    pub fn is_other_project(&self) -> bool {
        self.kind == ProjectKind::Other
    }

    /// Default location of the plugin cache file.
    #[must_use]
    pub fn plugin_cache_path(&self) -> PathBuf {
        self.changelog_dir.join(PLUGIN_CACHE_FILENAME)
    }

    /// Location of `release.py` in an ansible-core checkout.
    #[must_use]
    pub fn core_release_file(&self) -> PathBuf {
        self.base_dir.join("lib").join("ansible").join("release.py")
    }
}
