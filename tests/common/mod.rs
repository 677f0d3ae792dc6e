//! Shared helpers for integration tests.
//!
//! Most tests drive [`PluginLoader`](plugmeta_cli::plugins::cache::PluginLoader) with a
//! [`FakeDocRunner`] that imitates `ansible-doc` closely enough for the pipeline:
//! `--version` reports a configurable release and `--json -t <type> <names>...` answers
//! with documentation produced by a test-supplied closure.

#![allow(dead_code)]

use plugmeta_cli::test_utils::FakeDocRunner;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Value following `flag` in `args`.
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).map(String::as_str)
}

/// `--playbook-dir` of an invocation.
pub fn playbook_dir(args: &[String]) -> Option<PathBuf> {
    flag_value(args, "--playbook-dir").map(PathBuf::from)
}

/// Positional arguments of a `--json` invocation (the plugin names).
pub fn positional_names(args: &[String]) -> Vec<String> {
    let mut names = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-t" | "--playbook-dir" => {
                iter.next();
            }
            flag if flag.starts_with('-') => {}
            name => names.push(name.to_string()),
        }
    }
    names
}

/// Root of the staged collection below a playbook directory.
pub fn staged_collection(playbook_dir: &Path, namespace: &str, name: &str) -> PathBuf {
    playbook_dir.join("collections").join("ansible_collections").join(namespace).join(name)
}

/// A pre-2.13 `ansible-doc`.
///
/// `docs(type, name, playbook_dir)` supplies the record for each requested plugin;
/// `None` leaves the plugin out of the answer. `--list` is not supported.
pub fn legacy_runner<F>(version_output: &str, docs: F) -> FakeDocRunner
where
    F: Fn(&str, &str, Option<&Path>) -> Option<Value> + Send + Sync + 'static,
{
    let version_output = version_output.to_string();
    FakeDocRunner::new(move |args| {
        if args.iter().any(|a| a == "--version") {
            return Ok(version_output.clone());
        }
        assert!(!args.iter().any(|a| a == "--list"), "unexpected --list call: {args:?}");
        assert!(!args.iter().any(|a| a == "--metadata-dump"), "unexpected dump call: {args:?}");

        let plugin_type = flag_value(args, "-t").unwrap_or_default().to_string();
        let playbook_dir = playbook_dir(args);
        let mut result = Map::new();
        for name in positional_names(args) {
            if let Some(doc) = docs(&plugin_type, &name, playbook_dir.as_deref()) {
                result.insert(name, doc);
            }
        }
        Ok(Value::Object(result).to_string())
    })
}

/// A plain `{"doc": {...}}` record.
pub fn doc(short_description: &str, version_added: Option<&str>) -> Value {
    let mut doc = Map::new();
    doc.insert("short_description".to_string(), Value::from(short_description));
    if let Some(version) = version_added {
        doc.insert("version_added".to_string(), Value::from(version));
    }
    let mut record = Map::new();
    record.insert("doc".to_string(), Value::Object(doc));
    Value::Object(record)
}

/// Parses a cache file as generic YAML.
pub fn read_cache_yaml(path: &Path) -> serde_yaml::Value {
    let content = std::fs::read_to_string(path).unwrap();
    serde_yaml::from_str(&content).unwrap()
}
