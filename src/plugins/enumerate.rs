//! Discovering which plugins of a type exist.
//!
//! Two strategies produce the same list of fully qualified names:
//!
//! - [`ListStrategy::Walk`] scans the plugin directory for `.py` files. Cheap and
//!   works without an Ansible installation, but only understands Python plugins.
//! - [`ListStrategy::AnsibleDoc`] asks `ansible-doc --list`. Required for roles and
//!   for plugins written in other languages.

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

use super::paths::plugins_path;
use super::{BUILTIN_COLLECTION, PLUGIN_EXCEPTIONS, PluginCategory, fetch};
use crate::config::PathsConfig;
use crate::docs::DocToolRunner;
use crate::utils::fs::is_empty_dir;
use crate::utils::platform::{canonicalize_or_self, relative_path};

/// How plugin names are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStrategy {
    /// Scan the filesystem
    Walk,
    /// Ask `ansible-doc --list`
    AnsibleDoc,
}

impl ListStrategy {
    /// Picks the strategy for a category. Objects can only be listed by `ansible-doc`.
    #[must_use]
    pub fn select(use_ansible_doc: bool, category: PluginCategory) -> Self {
        if use_ansible_doc || category == PluginCategory::Object {
            Self::AnsibleDoc
        } else {
            Self::Walk
        }
    }

    /// Lists plugin names of `plugin_type` with this strategy.
    pub async fn list<R: DocToolRunner>(
        self,
        runner: &R,
        paths: &PathsConfig,
        playbook_dir: Option<&Path>,
        plugin_type: &str,
        category: PluginCategory,
        collection_name: Option<&str>,
    ) -> Result<Vec<String>> {
        match self {
            Self::Walk => Ok(list_plugins_walk(paths, plugin_type, collection_name)),
            Self::AnsibleDoc => {
                list_plugins_ansible_doc(
                    runner,
                    paths,
                    playbook_dir,
                    plugin_type,
                    category,
                    collection_name,
                )
                .await
            }
        }
    }
}

/// Lists plugins of `plugin_type` by scanning the filesystem.
///
/// Modules are searched recursively, other types only at the top level. The result is
/// sorted and free of duplicates (symlinked aliases resolve to their target). A
/// missing plugin directory yields an empty list.
#[must_use]
pub fn list_plugins_walk(
    paths: &PathsConfig,
    plugin_type: &str,
    collection_name: Option<&str>,
) -> Vec<String> {
    let source = plugins_path(paths, plugin_type, PluginCategory::Plugin);
    let Ok(root) = std::fs::canonicalize(&source) else {
        tracing::debug!(target: "plugins", "No {} directory at {}", plugin_type, source.display());
        return Vec::new();
    };

    let in_collection = paths.is_collection();
    let max_depth = if plugin_type == "module" { usize::MAX } else { 1 };
    let mut names = BTreeSet::new();

    let entries = WalkDir::new(&root).min_depth(1).max_depth(max_depth).into_iter().filter_map(Result::ok);
    for entry in entries {
        if entry.file_type().is_dir() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if file_name == "__init__.py" || !file_name.ends_with(".py") {
            continue;
        }
        if !in_collection
            && entry.depth() == 1
            && PLUGIN_EXCEPTIONS.iter().any(|(t, f)| *t == plugin_type && *f == file_name)
        {
            continue;
        }

        let real = canonicalize_or_self(entry.path()).with_extension("");
        let relative = relative_path(&real, &root);
        let segments: Vec<String> =
            relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();

        let name = if !in_collection && segments.len() > 1 {
            segments.last().cloned().unwrap_or_default()
        } else {
            segments.join(".")
        };
        let name = match collection_name {
            Some(collection) => format!("{collection}.{name}"),
            None => name,
        };
        names.insert(name);
    }

    tracing::debug!(target: "plugins", "Found {} {} plugins by walking {}", names.len(), plugin_type, root.display());
    names.into_iter().collect()
}

/// Lists plugins of `plugin_type` with `ansible-doc --list`.
///
/// Skips the tool entirely when the plugin directory is missing or empty. Without a
/// collection, only ansible-core's own plugins are kept (unqualified names or
/// `ansible.builtin.*`); with one, only names inside that collection.
pub async fn list_plugins_ansible_doc<R: DocToolRunner>(
    runner: &R,
    paths: &PathsConfig,
    playbook_dir: Option<&Path>,
    plugin_type: &str,
    category: PluginCategory,
    collection_name: Option<&str>,
) -> Result<Vec<String>> {
    let source = plugins_path(paths, plugin_type, category);
    if !source.exists() || is_empty_dir(&source) {
        tracing::debug!(target: "plugins", "Skipping {}: {} is missing or empty", plugin_type, source.display());
        return Ok(Vec::new());
    }

    let listing = fetch::list_plugins(runner, playbook_dir, plugin_type, collection_name).await?;
    let builtin_prefix = format!("{BUILTIN_COLLECTION}.");
    let collection_prefix = collection_name.map(|c| format!("{c}."));

    let mut names: Vec<String> = listing
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| match collection_prefix {
            Some(ref prefix) => name.starts_with(prefix.as_str()),
            None => !name.contains('.') || name.starts_with(&builtin_prefix),
        })
        .collect();
    names.sort();
    Ok(names)
}
