//! Load plugin metadata and print it.
//!
//! Refreshes `changelogs/.plugin-cache.yaml` when it is missing, was built for a
//! different release, or `--force-reload` is given.
//!
//! # Examples
//!
//! ```bash
//! # Collection in the current directory, version from galaxy.yml
//! plugmeta plugins
//!
//! # ansible-core checkout, JSON output
//! plugmeta --base-dir ~/src/ansible plugins --version 2.16.0 --format json
//!
//! # Enumerate with ansible-doc and rebuild the cache
//! plugmeta plugins --use-ansible-doc --force-reload
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;
use std::time::Duration;

use crate::config::{ChangelogConfig, CollectionDetails, PathsConfig};
use crate::core::PlugmetaError;
use crate::docs::AnsibleDocRunner;
use crate::plugins::PluginDescription;
use crate::plugins::cache::{LoadOptions, PluginLoader};

/// Command to load and print plugin metadata.
#[derive(Args, Debug)]
pub struct PluginsCommand {
    /// Release version the cache is keyed by (defaults to the version in galaxy.yml)
    #[arg(long)]
    version: Option<String>,

    /// Ignore the cache file and rebuild it
    #[arg(long)]
    force_reload: bool,

    /// List plugins with `ansible-doc --list` instead of walking plugin directories
    ///
    /// Only affects ansible-core releases before 2.13; newer releases always use
    /// `ansible-doc --metadata-dump`.
    #[arg(long)]
    use_ansible_doc: bool,

    /// End every description with a period
    #[arg(long)]
    add_plugin_period: bool,

    /// Assume this ansible-core version instead of asking `ansible-doc --version`
    #[arg(long, value_name = "VERSION")]
    ansible_core_version: Option<String>,

    /// Collection namespace (overrides galaxy.yml)
    #[arg(long, requires = "collection_name")]
    collection_namespace: Option<String>,

    /// Collection name (overrides galaxy.yml)
    #[arg(long, requires = "collection_namespace")]
    collection_name: Option<String>,

    /// Abort an `ansible-doc` call that runs longer than this many seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Output format (text, yaml, json)
    #[arg(short = 'f', long, default_value = "text")]
    format: String,
}

impl PluginsCommand {
    /// Runs the command for the project at `base_dir`.
    pub async fn execute(self, base_dir: &Path, ansible_doc: Option<&Path>) -> Result<()> {
        self.validate_arguments()?;

        let mut paths = PathsConfig::detect(base_dir);
        if let Some(doc) = ansible_doc {
            paths = paths.with_ansible_doc(doc);
        }
        if let Some(ref version) = self.ansible_core_version {
            paths = paths.with_core_version(version);
        }

        let collection = self.collection_details(&paths)?;
        let version = match (self.version.clone(), collection.as_ref().and_then(CollectionDetails::version)) {
            (Some(version), _) => version,
            (None, Some(version)) => version.to_string(),
            (None, None) if paths.is_other_project() => String::new(),
            (None, None) => return Err(PlugmetaError::MissingVersion.into()),
        };

        let config = ChangelogConfig::load(&paths.changelog_dir)?;
        let runner = AnsibleDocRunner::new(&paths.ansible_doc_path)
            .with_timeout(self.timeout.map(Duration::from_secs));
        let loader = PluginLoader::new(paths, collection, config, runner);

        let options = LoadOptions {
            force_reload: self.force_reload,
            use_ansible_doc: self.use_ansible_doc,
            add_plugin_period: self.add_plugin_period,
        };
        let plugins = loader.load_plugins(&version, &options).await?;

        output_plugins(&plugins, &self.format)
    }

    fn validate_arguments(&self) -> Result<()> {
        match self.format.as_str() {
            "text" | "yaml" | "json" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid format '{}'. Valid formats are: text, yaml, json",
                self.format
            )),
        }
    }

    fn collection_details(&self, paths: &PathsConfig) -> Result<Option<CollectionDetails>> {
        if !paths.is_collection() {
            return Ok(None);
        }
        match (&self.collection_namespace, &self.collection_name) {
            (Some(namespace), Some(name)) => {
                let mut details = CollectionDetails::new(namespace, name);
                if let Some(version) =
                    CollectionDetails::load(&paths.base_dir).ok().and_then(|d| d.version().map(ToString::to_string))
                {
                    details = details.with_version(version);
                }
                Ok(Some(details))
            }
            _ => CollectionDetails::load(&paths.base_dir).map(Some),
        }
    }
}

/// Prints plugins in the requested format.
pub fn output_plugins(plugins: &[PluginDescription], format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(plugins)?),
        "yaml" => print!("{}", serde_yaml::to_string(plugins)?),
        _ => output_text(plugins),
    }
    Ok(())
}

fn output_text(plugins: &[PluginDescription]) {
    if plugins.is_empty() {
        println!("No plugins found.");
        return;
    }

    let mut current_type: Option<(&str, String)> = None;
    for plugin in plugins {
        let heading = (plugin.plugin_type.as_str(), plugin.category.to_string());
        if current_type.as_ref() != Some(&heading) {
            println!("{}:", format!("{} ({})", heading.0, heading.1).cyan().bold());
            current_type = Some(heading);
        }
        println!("  {}", format_line(plugin));
    }
    println!("{}: {} entries", "Total".green().bold(), plugins.len());
}

fn format_line(plugin: &PluginDescription) -> String {
    let name = match plugin.namespace.as_deref() {
        Some(namespace) if !namespace.is_empty() => format!("{namespace}.{}", plugin.name),
        _ => plugin.name.clone(),
    };
    let mut line = name.bold().to_string();
    if let Some(ref description) = plugin.description {
        line.push_str(&format!(" - {description}"));
    }
    if let Some(ref version) = plugin.version_added {
        line.push_str(&format!(" {}", format!("(added in {version})").dimmed()));
    }
    line
}
