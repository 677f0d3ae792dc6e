//! Git integration
//!
//! plugmeta only needs git for two things when staging a collection copy:
//! deciding whether the collection lives in a git work tree, and listing the files
//! git knows about so build artifacts and ignored files stay out of the copy.
//! Both go through the system `git` binary via [`command_builder::GitCommand`].

pub mod command_builder;

use anyhow::Result;
use std::path::{Path, PathBuf};

use command_builder::GitCommand;

/// Version control systems plugmeta can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vcs {
    /// No supported VCS (or git is unavailable)
    None,
    /// A git work tree
    Git,
}

/// Detects the version control system managing `path`.
///
/// Any git failure, including git not being installed, is reported as [`Vcs::None`].
pub async fn detect_vcs(path: &Path) -> Vcs {
    match GitCommand::is_inside_work_tree().current_dir(path).execute_stdout().await {
        Ok(output) if output == "true" => {
            tracing::debug!(target: "git", "Identified VCS as git for {}", path.display());
            Vcs::Git
        }
        Ok(_) | Err(_) => {
            tracing::debug!(target: "git", "No supported VCS found for {}", path.display());
            Vcs::None
        }
    }
}

/// Lists files under `dir` that git tracks or would track (untracked but not ignored).
///
/// Returned paths are relative to `dir`.
pub async fn list_tracked_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let output = GitCommand::ls_files().current_dir(dir).execute().await?;
    Ok(parse_ls_files(&output))
}

fn parse_ls_files(output: &str) -> Vec<PathBuf> {
    output.split('\0').filter(|entry| !entry.is_empty()).map(PathBuf::from).collect()
}
