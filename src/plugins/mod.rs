//! Plugin metadata collection
//!
//! This module gathers short metadata (name, namespace, description, version added)
//! for every plugin, module and role of an Ansible collection or an ansible-core
//! checkout, and caches it next to the changelog.
//!
//! # Pipeline
//!
//! ```text
//! PluginLoader::load_plugins
//!   ├─ cache hit ─────────────────────────────────────────────► descriptions
//!   └─ cache miss
//!        ├─ detect ansible-core version
//!        ├─ stage collection copy (collections only)   isolation
//!        ├─ per type: list names ───────────────────►  enumerate + fetch
//!        │  or one --metadata-dump call ───────────►  fetch
//!        ├─ normalize raw records ──────────────────►  normalize
//!        └─ store cache file ───────────────────────►  cache
//! ```
//!
//! The submodules are usable on their own; [`cache::PluginLoader`] ties them together.

pub mod cache;
pub mod enumerate;
pub mod fetch;
pub mod isolation;
pub mod normalize;
pub mod paths;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Plugin types `ansible-doc` can document.
pub const DOCUMENTABLE_PLUGINS: &[&str] = &[
    "become",
    "cache",
    "callback",
    "cliconf",
    "connection",
    "filter",
    "httpapi",
    "inventory",
    "lookup",
    "module",
    "netconf",
    "shell",
    "strategy",
    "test",
    "vars",
];

/// Object types `ansible-doc` can document.
pub const DOCUMENTABLE_OBJECTS: &[&str] = &["role"];

/// Files in an ansible-core checkout that look like plugins but are not.
pub const PLUGIN_EXCEPTIONS: &[(&str, &str)] = &[("cache", "base.py"), ("module", "async_wrapper.py")];

/// Collection name ansible-core's own plugins are dumped under.
pub const BUILTIN_COLLECTION: &str = "ansible.builtin";

/// Whether an entry is a plugin (modules included) or another documentable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginCategory {
    /// Plugins and modules
    Plugin,
    /// Roles
    Object,
}

impl PluginCategory {
    /// Both categories, in output order.
    pub const ALL: [Self; 2] = [Self::Plugin, Self::Object];

    /// Name of the cache file section holding this category.
    #[must_use]
    pub const fn section(self) -> &'static str {
        match self {
            Self::Plugin => "plugins",
            Self::Object => "objects",
        }
    }

    /// Types documented for this category.
    #[must_use]
    pub const fn documentable_types(self) -> &'static [&'static str] {
        match self {
            Self::Plugin => DOCUMENTABLE_PLUGINS,
            Self::Object => DOCUMENTABLE_OBJECTS,
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plugin => f.write_str("plugin"),
            Self::Object => f.write_str("object"),
        }
    }
}

/// One entry of the plugin cache.
///
/// `namespace` is only meaningful for modules: `None` means "no namespace" and is
/// left out of the cache file, `Some("")` is the root namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub description: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub version_added: Option<String>,
}

/// Records of one cache section, keyed by type and then by name.
pub type PluginSections = BTreeMap<String, BTreeMap<String, PluginRecord>>;

/// Metadata of one plugin or object, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDescription {
    pub category: PluginCategory,
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub description: Option<String>,
    pub version_added: Option<String>,
}

impl PluginDescription {
    /// Builds descriptions from one cache section, ordered by type and then name.
    ///
    /// The map key is used as the plugin name.
    #[must_use]
    pub fn from_section(
        sections: &PluginSections,
        category: PluginCategory,
        add_plugin_period: bool,
    ) -> Vec<Self> {
        let mut result = Vec::new();
        for (plugin_type, plugins) in sections {
            for (name, record) in plugins {
                let description = record.description.as_deref().map(|text| {
                    if add_plugin_period {
                        terminate_description(text)
                    } else {
                        text.to_string()
                    }
                });
                result.push(Self {
                    category,
                    plugin_type: plugin_type.clone(),
                    name: name.clone(),
                    namespace: record.namespace.clone(),
                    description,
                    version_added: record.version_added.clone(),
                });
            }
        }
        result
    }
}

/// Appends a period unless the text is empty or already ends in punctuation.
#[must_use]
pub fn terminate_description(text: &str) -> String {
    if text.is_empty() || text.ends_with(['.', ',', '!', '?']) {
        text.to_string()
    } else {
        format!("{text}.")
    }
}
