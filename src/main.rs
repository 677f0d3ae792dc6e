//! plugmeta CLI entry point
//!
//! Parses arguments, runs the selected command and renders errors with context and
//! suggestions:
//! - `plugins` - load (and cache) plugin metadata and print it
//! - `cache clear` - remove the plugin cache file

use anyhow::Result;
use clap::Parser;
use plugmeta_cli::cli;
use plugmeta_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
