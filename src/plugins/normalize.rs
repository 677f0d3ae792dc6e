//! Turning raw `ansible-doc` output into [`PluginRecord`]s.
//!
//! `ansible-doc` returns documentation in three shapes:
//!
//! - `{"doc": {...}}` for plugins in per-type `--json` output
//! - `{"entry_points": {"main": {...}}}` for roles
//! - the `--metadata-dump` tree, where names are fully qualified and module
//!   namespaces are encoded in the name (`ns.coll.cloud.amazon.ec2`)

use serde_json::Value;
use std::path::Path;

use super::{PluginCategory, PluginRecord};
use crate::utils::platform::{canonicalize_or_self, relative_path};

/// Output shape the raw record comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocShape {
    /// Per-type `ansible-doc --json` output
    Legacy,
    /// `ansible-doc --metadata-dump` output
    MetadataDump,
}

/// Per-refresh settings shared by every record.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    /// Fully qualified collection name, if any; stripped from plugin names
    pub collection_name: Option<&'a str>,
    /// Root directory module namespaces are relative to
    pub modules_root: &'a Path,
    pub shape: DocShape,
}

/// Builds a cache record for `name` from its raw documentation.
#[must_use]
pub fn normalize_record(
    ctx: &NormalizeContext<'_>,
    plugin_type: &str,
    category: PluginCategory,
    name: &str,
    raw: &Value,
) -> PluginRecord {
    let mut name = match ctx.collection_name {
        Some(collection) => name.strip_prefix(&format!("{collection}.")).unwrap_or(name),
        None => name,
    };

    let doc = documentation_block(raw, plugin_type, category);

    let mut namespace = None;
    if category == PluginCategory::Plugin && plugin_type == "module" {
        match ctx.shape {
            DocShape::MetadataDump => {
                if let Some((ns, bare)) = name.rsplit_once('.') {
                    namespace = Some(ns.to_string());
                    name = bare;
                } else {
                    namespace = Some(String::new());
                }
            }
            DocShape::Legacy => {
                if let Some(filename) = doc.and_then(|d| d.get("filename")).and_then(Value::as_str)
                {
                    if !filename.is_empty() {
                        namespace = Some(extract_namespace(ctx.modules_root, Path::new(filename)));
                    }
                }
                if let Some((_, bare)) = name.rsplit_once('.') {
                    name = bare;
                }
            }
        }
    }

    PluginRecord {
        description: doc.and_then(|d| scalar_to_string(d.get("short_description"))),
        name: name.to_string(),
        namespace,
        version_added: doc.and_then(|d| scalar_to_string(d.get("version_added"))),
    }
}

/// Module namespace of `filename`: its directory relative to `modules_root`, joined
/// with dots.
///
/// Both paths are resolved through symlinks first, so an aliased module gets the
/// namespace of its target. `.`, `..` and empty segments are dropped.
#[must_use]
pub fn extract_namespace(modules_root: &Path, filename: &Path) -> String {
    let root = canonicalize_or_self(modules_root);
    let file = canonicalize_or_self(filename);
    let relative = relative_path(&file, &root);

    relative
        .parent()
        .map(|dir| {
            dir.components()
                .filter_map(|c| match c {
                    std::path::Component::Normal(segment) => Some(segment.to_string_lossy()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(".")
        })
        .unwrap_or_default()
}

/// `ansible.builtin._foo` is the metadata dump's name for the internal alias of
/// `ansible.builtin.foo`.
#[must_use]
pub fn unmask_builtin_alias(name: &str) -> String {
    match name.strip_prefix("ansible.builtin._") {
        Some(rest) => format!("ansible.builtin.{rest}"),
        None => name.to_string(),
    }
}

fn documentation_block<'a>(
    raw: &'a Value,
    plugin_type: &str,
    category: PluginCategory,
) -> Option<&'a Value> {
    if category == PluginCategory::Object && plugin_type == "role" {
        if let Some(main) = raw.get("entry_points").and_then(|e| e.get("main")) {
            return Some(main);
        }
    }
    raw.get("doc")
}

fn scalar_to_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
