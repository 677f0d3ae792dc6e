//! The plugin cache and the loader that fills it.
//!
//! The cache lives at `<changelog_dir>/.plugin-cache.yaml` and is keyed by the
//! release version it was built for:
//!
//! ```yaml
//! version: 1.2.0
//! plugins:
//!   module:
//!     ec2:
//!       description: Create and manage EC2 instances
//!       name: ec2
//!       namespace: cloud.amazon
//!       version_added: 1.0.0
//! objects:
//!   role: {}
//! ```
//!
//! [`PluginLoader::load_plugins`] returns cached data when the version matches and
//! otherwise rebuilds the whole file from `ansible-doc` output.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::enumerate::ListStrategy;
use super::fetch::{self, RawDocs};
use super::isolation::{CollectionCopier, CopyStrategy};
use super::normalize::{DocShape, NormalizeContext, normalize_record, unmask_builtin_alias};
use super::paths::modules_root;
use super::{BUILTIN_COLLECTION, PluginCategory, PluginDescription, PluginRecord, PluginSections};
use crate::config::{ChangelogConfig, CollectionDetails, PathsConfig};
use crate::core::PlugmetaError;
use crate::docs::DocToolRunner;
use crate::docs::version::{CoreVersion, detect_core_version};
use crate::utils::fs::{read_yaml_file, write_yaml_file};

/// Contents of the plugin cache file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginCacheFile {
    /// Release version the cache was built for
    pub version: String,
    pub plugins: PluginSections,
    #[serde(default)]
    pub objects: PluginSections,
}

impl PluginCacheFile {
    /// Creates an empty cache for `version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Reads a cache file.
    pub fn load(path: &Path) -> Result<Self> {
        read_yaml_file(path)
    }

    /// Writes the cache file, replacing any previous content.
    pub fn store(&self, path: &Path) -> Result<()> {
        write_yaml_file(path, self)
            .with_context(|| format!("Failed to store plugin cache at {}", path.display()))
    }

    /// The section holding `category`.
    #[must_use]
    pub const fn section(&self, category: PluginCategory) -> &PluginSections {
        match category {
            PluginCategory::Plugin => &self.plugins,
            PluginCategory::Object => &self.objects,
        }
    }

    /// Mutable access to the section holding `category`.
    pub fn section_mut(&mut self, category: PluginCategory) -> &mut PluginSections {
        match category {
            PluginCategory::Plugin => &mut self.plugins,
            PluginCategory::Object => &mut self.objects,
        }
    }

    /// All entries as descriptions: plugins first, then objects.
    #[must_use]
    pub fn descriptions(&self, add_plugin_period: bool) -> Vec<PluginDescription> {
        PluginCategory::ALL
            .iter()
            .flat_map(|&category| {
                PluginDescription::from_section(self.section(category), category, add_plugin_period)
            })
            .collect()
    }
}

/// Options for [`PluginLoader::load_plugins`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Ignore an existing cache file
    pub force_reload: bool,
    /// List plugins with `ansible-doc --list` instead of walking the filesystem
    pub use_ansible_doc: bool,
    /// Terminate descriptions with a period
    pub add_plugin_period: bool,
}

/// How documentation is fetched for a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// One `ansible-doc --metadata-dump` call
    MetadataDump,
    /// List and document each type separately
    PerType {
        use_ansible_doc: bool,
    },
}

impl FetchPlan {
    /// Picks the plan supported by `core_version`.
    #[must_use]
    pub fn select(core_version: &CoreVersion, use_ansible_doc: bool) -> Self {
        if core_version.supports_metadata_dump() {
            Self::MetadataDump
        } else {
            Self::PerType {
                use_ansible_doc,
            }
        }
    }
}

/// Where one refresh reads plugins from.
struct Scope<'a> {
    paths: &'a PathsConfig,
    playbook_dir: Option<&'a Path>,
    collection_name: Option<&'a str>,
}

impl Scope<'_> {
    fn modules_root(&self) -> PathBuf {
        modules_root(self.paths, self.collection_name.is_some())
    }
}

/// Loads plugin metadata for a project, going through the cache file.
///
/// ```rust,no_run
/// use plugmeta_cli::config::{ChangelogConfig, PathsConfig};
/// use plugmeta_cli::docs::AnsibleDocRunner;
/// use plugmeta_cli::plugins::cache::{LoadOptions, PluginLoader};
///
/// # async fn example() -> anyhow::Result<()> {
/// let paths = PathsConfig::detect("/src/ansible");
/// let runner = AnsibleDocRunner::new(&paths.ansible_doc_path);
/// let loader = PluginLoader::new(paths, None, ChangelogConfig::default(), runner);
/// let plugins = loader.load_plugins("2.16.0", &LoadOptions::default()).await?;
/// # Ok(())
/// # }
/// ```
pub struct PluginLoader<R> {
    paths: PathsConfig,
    collection: Option<CollectionDetails>,
    config: ChangelogConfig,
    runner: R,
    cache_path: PathBuf,
    copy_strategy: Option<CopyStrategy>,
}

impl<R: DocToolRunner> PluginLoader<R> {
    /// Creates a loader. `collection` is required for collection projects.
    pub fn new(
        paths: PathsConfig,
        collection: Option<CollectionDetails>,
        config: ChangelogConfig,
        runner: R,
    ) -> Self {
        let cache_path = paths.plugin_cache_path();
        Self {
            paths,
            collection,
            config,
            runner,
            cache_path,
            copy_strategy: None,
        }
    }

    /// Uses a different cache file.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    /// Forces a copy strategy instead of resolving the configured VCS setting.
    #[must_use]
    pub const fn with_copy_strategy(mut self, strategy: CopyStrategy) -> Self {
        self.copy_strategy = Some(strategy);
        self
    }

    /// Location of the cache file.
    #[must_use]
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// The documentation tool runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Returns metadata for every plugin and object of the project at `version`.
    ///
    /// Uses the cache file when it was built for `version` (and `force_reload` is
    /// unset); otherwise rebuilds it and stores the result. Projects that are neither
    /// a collection nor ansible-core have no plugins and never run any tool.
    pub async fn load_plugins(&self, version: &str, options: &LoadOptions) -> Result<Vec<PluginDescription>> {
        if self.paths.is_other_project() {
            tracing::debug!(target: "plugins", "Not a collection or ansible-core, no plugins to load");
            return Ok(Vec::new());
        }

        let cached = if options.force_reload {
            None
        } else {
            self.read_cache(version)
        };

        let data = match cached {
            Some(data) => {
                tracing::debug!(target: "plugins", "Using plugin cache {}", self.cache_path.display());
                data
            }
            None => {
                let data = self.refresh(version, options.use_ansible_doc).await?;
                data.store(&self.cache_path)?;
                data
            }
        };

        Ok(data.descriptions(options.add_plugin_period || self.config.add_plugin_period))
    }

    /// Reads the cache file if it is usable for `version`.
    fn read_cache(&self, version: &str) -> Option<PluginCacheFile> {
        if !self.cache_path.exists() {
            return None;
        }
        match PluginCacheFile::load(&self.cache_path) {
            Ok(data) if data.version == version => Some(data),
            Ok(data) => {
                tracing::info!(
                    target: "plugins",
                    "version {} does not match plugin cache version {}",
                    version,
                    data.version
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    target: "plugins",
                    "Ignoring unusable plugin cache {}: {:#}",
                    self.cache_path.display(),
                    e
                );
                None
            }
        }
    }

    /// Rebuilds plugin metadata from `ansible-doc` without touching the cache file.
    pub async fn refresh(&self, version: &str, use_ansible_doc: bool) -> Result<PluginCacheFile> {
        tracing::info!(target: "plugins", "refreshing plugin cache");

        let core_version = detect_core_version(&self.paths, &self.runner).await?;
        let plan = FetchPlan::select(&core_version, use_ansible_doc);
        tracing::debug!(target: "plugins", "ansible-core {} selects {:?}", core_version, plan);

        let mut data = PluginCacheFile::new(version);

        if self.paths.is_collection() {
            let collection = self.collection.as_ref().ok_or_else(|| PlugmetaError::ConfigError {
                message: "collection details are required to load collection plugins".to_string(),
            })?;
            let fqcn = collection.fqcn();
            let strategy = match self.copy_strategy {
                Some(strategy) => strategy,
                None => CopyStrategy::resolve(self.config.vcs, &self.paths.base_dir).await,
            };
            let staged = CollectionCopier::new(&self.paths.base_dir, collection.namespace(), collection.name())
                .with_strategy(strategy)
                .stage()
                .await?;
            let staged_paths = staged.paths(&self.paths);
            let scope = Scope {
                paths: &staged_paths,
                playbook_dir: Some(staged.playbook_dir()),
                collection_name: Some(&fqcn),
            };

            match plan {
                FetchPlan::MetadataDump => self.load_dump(&mut data, &scope).await?,
                FetchPlan::PerType {
                    use_ansible_doc,
                } => {
                    for category in PluginCategory::ALL {
                        self.load_types(&mut data, &scope, category, use_ansible_doc).await?;
                    }
                }
            }
        } else {
            match plan {
                FetchPlan::MetadataDump => {
                    let scope = Scope {
                        paths: &self.paths,
                        playbook_dir: None,
                        collection_name: Some(BUILTIN_COLLECTION),
                    };
                    self.load_dump(&mut data, &scope).await?;
                }
                FetchPlan::PerType {
                    use_ansible_doc,
                } => {
                    let scope = Scope {
                        paths: &self.paths,
                        playbook_dir: None,
                        collection_name: None,
                    };
                    self.load_types(&mut data, &scope, PluginCategory::Plugin, use_ansible_doc).await?;
                }
            }
        }

        let count: usize = PluginCategory::ALL
            .iter()
            .map(|&c| data.section(c).values().map(BTreeMap::len).sum::<usize>())
            .sum();
        tracing::info!(target: "plugins", "Collected metadata for {} plugins and objects", count);
        Ok(data)
    }

    async fn load_dump(&self, data: &mut PluginCacheFile, scope: &Scope<'_>) -> Result<()> {
        tracing::debug!(target: "plugins", "Run ansible-doc for {:?}", scope.playbook_dir);
        let all = fetch::metadata_dump(&self.runner, scope.playbook_dir, scope.collection_name).await?;

        let root = scope.modules_root();
        let ctx = NormalizeContext {
            collection_name: scope.collection_name,
            modules_root: &root,
            shape: DocShape::MetadataDump,
        };

        for category in PluginCategory::ALL {
            for &plugin_type in category.documentable_types() {
                let Some(Value::Object(entries)) = all.get(plugin_type) else {
                    continue;
                };
                let section = data.section_mut(category).entry(plugin_type.to_string()).or_default();
                for (name, raw) in entries {
                    let name = unmask_builtin_alias(name);
                    let record = normalize_record(&ctx, plugin_type, category, &name, raw);
                    section.insert(record.name.clone(), record);
                }
            }
        }
        Ok(())
    }

    async fn load_types(
        &self,
        data: &mut PluginCacheFile,
        scope: &Scope<'_>,
        category: PluginCategory,
        use_ansible_doc: bool,
    ) -> Result<()> {
        for &plugin_type in category.documentable_types() {
            let records = self.load_type(scope, plugin_type, category, use_ansible_doc).await?;
            data.section_mut(category).insert(plugin_type.to_string(), records);
        }
        Ok(())
    }

    async fn load_type(
        &self,
        scope: &Scope<'_>,
        plugin_type: &str,
        category: PluginCategory,
        use_ansible_doc: bool,
    ) -> Result<BTreeMap<String, PluginRecord>> {
        let names = ListStrategy::select(use_ansible_doc, category)
            .list(&self.runner, scope.paths, scope.playbook_dir, plugin_type, category, scope.collection_name)
            .await?;

        let mut result = BTreeMap::new();
        if names.is_empty() {
            return Ok(result);
        }

        let docs: RawDocs = fetch::fetch_docs(&self.runner, scope.playbook_dir, plugin_type, &names).await?;
        let root = scope.modules_root();
        let ctx = NormalizeContext {
            collection_name: scope.collection_name,
            modules_root: &root,
            shape: DocShape::Legacy,
        };
        for (name, raw) in &docs {
            let record = normalize_record(&ctx, plugin_type, category, name, raw);
            result.insert(record.name.clone(), record);
        }
        Ok(result)
    }

    /// Deletes the cache file. Returns whether there was one.
    pub fn clear_cache(&self) -> Result<bool> {
        if !self.cache_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.cache_path)
            .with_context(|| format!("Failed to remove plugin cache {}", self.cache_path.display()))?;
        tracing::info!(target: "plugins", "Removed plugin cache {}", self.cache_path.display());
        Ok(true)
    }
}
