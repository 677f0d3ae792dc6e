//! Where plugin sources live on disk.

use std::path::PathBuf;

use super::PluginCategory;
use crate::config::PathsConfig;

/// Returns the directory expected to hold sources of `plugin_type`.
///
/// | Project | Category | Directory |
/// |---|---|---|
/// | collection | object | `<base>/<type>s` |
/// | collection | plugin | `<base>/plugins/<type>` (`modules` for modules) |
/// | ansible-core | plugin | `<base>/lib/ansible/plugins/<type>` (`lib/ansible/modules` for modules) |
///
/// The directory does not have to exist.
#[must_use]
pub fn plugins_path(paths: &PathsConfig, plugin_type: &str, category: PluginCategory) -> PathBuf {
    if paths.is_collection() {
        if category == PluginCategory::Object {
            return paths.base_dir.join(format!("{plugin_type}s"));
        }
        let dir = if plugin_type == "module" { "modules" } else { plugin_type };
        return paths.base_dir.join("plugins").join(dir);
    }

    if plugin_type == "module" {
        paths.base_dir.join("lib").join("ansible").join("modules")
    } else {
        paths.base_dir.join("lib").join("ansible").join("plugins").join(plugin_type)
    }
}

/// Root that module namespaces are computed against.
#[must_use]
pub fn modules_root(paths: &PathsConfig, in_collection: bool) -> PathBuf {
    if in_collection {
        paths.base_dir.join("plugins").join("modules")
    } else {
        paths.base_dir.join("lib").join("ansible").join("modules")
    }
}
