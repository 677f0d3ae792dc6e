//! Manage the plugin cache file.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::Path;

use crate::config::{ChangelogConfig, PathsConfig};
use crate::docs::AnsibleDocRunner;
use crate::plugins::cache::PluginLoader;

/// Command to manage the plugin cache.
#[derive(Args, Debug)]
pub struct CacheCommand {
    #[command(subcommand)]
    command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
enum CacheSubcommand {
    /// Remove `changelogs/.plugin-cache.yaml`
    ///
    /// The next `plugmeta plugins` run rebuilds it from ansible-doc.
    Clear,
}

impl CacheCommand {
    /// Runs the command for the project at `base_dir`.
    pub async fn execute(self, base_dir: &Path) -> Result<()> {
        match self.command {
            CacheSubcommand::Clear => {
                let paths = PathsConfig::detect(base_dir);
                let runner = AnsibleDocRunner::new(&paths.ansible_doc_path);
                let loader = PluginLoader::new(paths, None, ChangelogConfig::default(), runner);
                if loader.clear_cache()? {
                    println!("{} {}", "Removed".green().bold(), loader.cache_path().display());
                } else {
                    println!("No plugin cache at {}", loader.cache_path().display());
                }
                Ok(())
            }
        }
    }
}
