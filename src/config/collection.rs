use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::core::PlugmetaError;
use crate::utils::fs::read_yaml_file;

/// The subset of `galaxy.yml` plugmeta reads.
#[derive(Debug, Deserialize)]
struct GalaxyFile {
    namespace: Option<String>,
    name: Option<String>,
    version: Option<String>,
}

/// Identity of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDetails {
    namespace: String,
    name: String,
    version: Option<String>,
}

impl CollectionDetails {
    /// Creates collection details from explicit values.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            version: None,
        }
    }

    /// Sets the collection version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Reads namespace, name and version from `<base_dir>/galaxy.yml`.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing, unparseable, or lacks `namespace`/`name`.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join("galaxy.yml");
        let galaxy: GalaxyFile = read_yaml_file(&path)
            .with_context(|| format!("Failed to load collection details from {}", path.display()))?;

        let (Some(namespace), Some(name)) = (galaxy.namespace, galaxy.name) else {
            return Err(PlugmetaError::ConfigError {
                message: format!("{} must define both `namespace` and `name`", path.display()),
            }
            .into());
        };

        Ok(Self {
            namespace,
            name,
            version: galaxy.version,
        })
    }

    /// The collection namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collection version, if known.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// `<namespace>.<name>`
    #[must_use]
    pub fn fqcn(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}
