//! Raw documentation retrieval through `ansible-doc`.
//!
//! Every function builds one invocation, runs it through a [`DocToolRunner`] and
//! parses stdout as a JSON object. A failing tool or output that isn't a JSON object
//! is an error; nothing is retried.

use anyhow::Result;
use serde_json::{Map, Value};
use std::path::Path;

use crate::core::PlugmetaError;
use crate::docs::DocToolRunner;

/// A JSON object as returned by `ansible-doc`.
pub type RawDocs = Map<String, Value>;

fn playbook_dir_args(args: &mut Vec<String>, playbook_dir: Option<&Path>) {
    if let Some(dir) = playbook_dir {
        args.push("--playbook-dir".to_string());
        args.push(dir.to_string_lossy().into_owned());
    }
}

fn parse_object(output: &str, operation: &str) -> Result<RawDocs> {
    match serde_json::from_str::<Value>(output) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(PlugmetaError::DocOutputInvalid {
            operation: operation.to_string(),
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }
        .into()),
        Err(e) => Err(PlugmetaError::DocOutputInvalid {
            operation: operation.to_string(),
            reason: e.to_string(),
        }
        .into()),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Lists plugins of `plugin_type`: `--json -t <type> --list [--playbook-dir d] [collection]`.
///
/// Returns a map from plugin name to its short description.
pub async fn list_plugins<R: DocToolRunner>(
    runner: &R,
    playbook_dir: Option<&Path>,
    plugin_type: &str,
    collection_name: Option<&str>,
) -> Result<RawDocs> {
    let mut args = vec!["--json".to_string(), "-t".to_string(), plugin_type.to_string(), "--list".to_string()];
    playbook_dir_args(&mut args, playbook_dir);
    if let Some(collection) = collection_name {
        args.push(collection.to_string());
    }

    let output = runner.run(args).await?;
    parse_object(&output, "--list")
}

/// Fetches documentation for `names`: `--json -t <type> [--playbook-dir d] <names>...`.
pub async fn fetch_docs<R: DocToolRunner>(
    runner: &R,
    playbook_dir: Option<&Path>,
    plugin_type: &str,
    names: &[String],
) -> Result<RawDocs> {
    let mut args = vec!["--json".to_string(), "-t".to_string(), plugin_type.to_string()];
    playbook_dir_args(&mut args, playbook_dir);
    args.extend(names.iter().cloned());

    let output = runner.run(args).await?;
    parse_object(&output, "--json")
}

/// Dumps metadata of everything visible: `--metadata-dump [collection] [--playbook-dir d]`.
///
/// Returns the `all` member, a map from plugin type to documented entries.
pub async fn metadata_dump<R: DocToolRunner>(
    runner: &R,
    playbook_dir: Option<&Path>,
    collection_name: Option<&str>,
) -> Result<RawDocs> {
    let mut args = vec!["--metadata-dump".to_string()];
    if let Some(collection) = collection_name {
        args.push(collection.to_string());
    }
    playbook_dir_args(&mut args, playbook_dir);

    let output = runner.run(args).await?;
    let mut dump = parse_object(&output, "--metadata-dump")?;
    match dump.remove("all") {
        Some(Value::Object(all)) => Ok(all),
        _ => Err(PlugmetaError::DocOutputInvalid {
            operation: "--metadata-dump".to_string(),
            reason: "missing `all` object".to_string(),
        }
        .into()),
    }
}
