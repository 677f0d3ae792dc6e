use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::fs::read_yaml_file;

/// Which version control system to assume when staging a collection copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsSetting {
    /// Detect git, fall back to a plain copy
    #[default]
    Auto,
    /// Copy the whole tree
    None,
    /// Copy only files git knows about
    Git,
}

/// Options from `changelogs/config.yaml` that affect plugin metadata.
///
/// Other keys in that file belong to the changelog generator and are ignored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogConfig {
    /// Copy strategy selection for collection staging.
    #[serde(default)]
    pub vcs: VcsSetting,

    /// Terminate plugin descriptions with a period.
    #[serde(default)]
    pub add_plugin_period: bool,
}

impl ChangelogConfig {
    /// Loads `<changelog_dir>/config.yaml`, returning defaults when it doesn't exist.
    pub fn load(changelog_dir: &Path) -> Result<Self> {
        let path = changelog_dir.join("config.yaml");
        if !path.exists() {
            tracing::debug!(target: "config", "No changelog config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        read_yaml_file(&path)
    }
}
