//! Command-line interface for plugmeta.
//!
//! # Commands
//!
//! - `plugins` - load plugin metadata through the cache and print it
//! - `cache clear` - remove the plugin cache file
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - errors only
//! - `--base-dir <DIR>` - project root (defaults to the current directory)
//! - `--ansible-doc <PATH>` - documentation tool (defaults to `ansible-doc` on `PATH`)
//!
//! Logging goes to stderr, so `--format json` / `--format yaml` output on stdout stays
//! machine-readable. `RUST_LOG` overrides the level chosen by the flags.

mod cache;
mod plugins;

pub use cache::CacheCommand;
pub use plugins::{PluginsCommand, output_plugins};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive (`debug`, `info`, `error`)
    pub log_level: String,

    /// Project root
    pub base_dir: Option<PathBuf>,

    /// Documentation tool override
    pub ansible_doc: Option<PathBuf>,
}

impl CliConfig {
    /// Installs the global tracing subscriber.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(&self.log_level)
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Collect and cache Ansible plugin metadata.
#[derive(Parser, Debug)]
#[command(
    name = "plugmeta",
    about = "Collect and cache metadata of Ansible plugins, modules and roles",
    version,
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Root of the collection or ansible-core checkout
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Path to the ansible-doc executable
    #[arg(long, global = true, value_name = "PATH", env = "PLUGMETA_ANSIBLE_DOC")]
    ansible_doc: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load plugin metadata (refreshing the cache if needed) and print it
    Plugins(PluginsCommand),

    /// Manage the plugin cache file
    Cache(CacheCommand),
}

impl Cli {
    /// Executes the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Builds a [`CliConfig`] from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            base_dir: self.base_dir.clone(),
            ansible_doc: self.ansible_doc.clone(),
        }
    }

    /// Executes the command with an explicit configuration, without touching logging.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let base_dir = match config.base_dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("Cannot determine the current directory")?,
        };

        match self.command {
            Commands::Plugins(cmd) => cmd.execute(&base_dir, config.ansible_doc.as_deref()).await,
            Commands::Cache(cmd) => cmd.execute(&base_dir).await,
        }
    }
}
