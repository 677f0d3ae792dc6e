//! Staging a collection into a throwaway `ansible_collections` tree.
//!
//! `ansible-doc` only finds a collection when it sits at
//! `collections/ansible_collections/<namespace>/<name>` below the playbook directory.
//! Rather than touching the user's checkout, [`CollectionCopier`] builds that layout
//! in a fresh temporary directory:
//!
//! ```text
//! <tmp>/                                           playbook dir
//!   collections/ansible_collections/<ns>/<name>/   collection copy
//! ```
//!
//! The returned [`StagedCollection`] owns the temporary directory and deletes it when
//! dropped, so the tree disappears on success, on error and on cancellation alike.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{PathsConfig, VcsSetting};
use crate::core::PlugmetaError;
use crate::git::{self, Vcs};
use crate::utils::fs::{copy_dir, copy_entry, ensure_dir};
use crate::utils::platform::{canonicalize_or_self, create_symlink};

/// How the collection content gets into the staging tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStrategy {
    /// Copy files git tracks, plus untracked files that aren't ignored
    Git,
    /// Copy the whole directory tree
    Plain,
    /// Symlink the collection directory to the source
    Link,
}

impl CopyStrategy {
    /// Resolves the configured VCS setting for `source`.
    pub async fn resolve(setting: VcsSetting, source: &Path) -> Self {
        match setting {
            VcsSetting::Git => Self::Git,
            VcsSetting::None => Self::Plain,
            VcsSetting::Auto => match git::detect_vcs(source).await {
                Vcs::Git => Self::Git,
                Vcs::None => Self::Plain,
            },
        }
    }
}

/// Builds staged copies of one collection.
#[derive(Debug, Clone)]
pub struct CollectionCopier {
    source: PathBuf,
    namespace: String,
    name: String,
    strategy: CopyStrategy,
}

impl CollectionCopier {
    /// Creates a copier for the collection at `source`. Defaults to [`CopyStrategy::Plain`].
    pub fn new(source: impl Into<PathBuf>, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            namespace: namespace.into(),
            name: name.into(),
            strategy: CopyStrategy::Plain,
        }
    }

    /// Sets the copy strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: CopyStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builds a new staging tree. Every call gets its own temporary directory.
    ///
    /// # Errors
    ///
    /// Returns [`PlugmetaError::IsolationFailed`] when the namespace or name is not a
    /// plain directory name, or when the copy fails. Partially built trees are removed.
    pub async fn stage(&self) -> Result<StagedCollection> {
        validate_component(&self.namespace)?;
        validate_component(&self.name)?;

        let temp = tempfile::Builder::new().prefix("plugmeta-").tempdir().map_err(|e| {
            PlugmetaError::IsolationFailed {
                reason: format!("cannot create temporary directory: {e}"),
            }
        })?;
        let playbook_dir = canonicalize_or_self(temp.path());
        let container =
            playbook_dir.join("collections").join("ansible_collections").join(&self.namespace);
        let collection_dir = container.join(&self.name);

        tracing::debug!(
            target: "plugins",
            "Staging {}.{} from {} into {} ({:?})",
            self.namespace,
            self.name,
            self.source.display(),
            collection_dir.display(),
            self.strategy
        );

        let copied = match ensure_dir(&container) {
            Ok(()) => self.copy_into(&collection_dir).await,
            Err(e) => Err(e),
        };
        if let Err(e) = copied {
            return Err(PlugmetaError::IsolationFailed {
                reason: format!("{e:#}"),
            }
            .into());
        }

        Ok(StagedCollection {
            temp,
            playbook_dir,
            collection_dir,
        })
    }

    async fn copy_into(&self, collection_dir: &Path) -> Result<()> {
        match self.strategy {
            CopyStrategy::Plain => copy_dir(&self.source, collection_dir),
            CopyStrategy::Git => {
                let files = git::list_tracked_files(&self.source).await?;
                ensure_dir(collection_dir)?;
                for file in &files {
                    copy_entry(&self.source.join(file), &collection_dir.join(file))?;
                }
                tracing::debug!(target: "plugins", "Copied {} tracked files", files.len());
                Ok(())
            }
            CopyStrategy::Link => {
                let source = canonicalize_or_self(&self.source);
                if create_symlink(&source, collection_dir).is_ok() {
                    Ok(())
                } else {
                    tracing::debug!(target: "plugins", "Symlink unavailable, copying instead");
                    copy_dir(&self.source, collection_dir)
                }
            }
        }
    }
}

fn validate_component(value: &str) -> Result<()> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(PlugmetaError::IsolationFailed {
            reason: format!("invalid collection path component {value:?}"),
        }
        .into());
    }
    Ok(())
}

/// A staged collection. The temporary tree is deleted when this is dropped.
#[derive(Debug)]
pub struct StagedCollection {
    temp: TempDir,
    playbook_dir: PathBuf,
    collection_dir: PathBuf,
}

impl StagedCollection {
    /// Directory to pass as `--playbook-dir`.
    #[must_use]
    pub fn playbook_dir(&self) -> &Path {
        &self.playbook_dir
    }

    /// Root of the staged collection.
    #[must_use]
    pub fn collection_dir(&self) -> &Path {
        &self.collection_dir
    }

    /// Paths configuration pointing at the staged copy.
    #[must_use]
    pub fn paths(&self, original: &PathsConfig) -> PathsConfig {
        let mut paths = PathsConfig::force_collection(&self.collection_dir, &original.ansible_doc_path);
        paths.core_version.clone_from(&original.core_version);
        paths
    }

    /// Deletes the staging tree now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<()> {
        let location = self.temp.path().to_path_buf();
        self.temp.close().map_err(|e| {
            PlugmetaError::IsolationFailed {
                reason: format!("cannot remove {}: {e}", location.display()),
            }
            .into()
        })
    }
}
