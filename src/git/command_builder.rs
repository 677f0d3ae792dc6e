//! Git command builder
//!
//! Fluent API for building and running the handful of git commands plugmeta needs
//! (work-tree detection and tracked-file listing) with consistent logging and error
//! reporting.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::core::PlugmetaError;

/// Builder for a single git invocation.
///
/// Commands run with `git -C <dir>` when a working directory is set, capture stdout
/// and stderr, and turn a non-zero exit status into
/// [`PlugmetaError::GitCommandError`].
///
/// ```rust,no_run
/// use plugmeta_cli::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let inside = GitCommand::is_inside_work_tree()
///     .current_dir("/path/to/collection")
///     .execute_stdout()
///     .await?;
/// assert_eq!(inside, "true");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct GitCommand {
    /// Command arguments to pass to git
    args: Vec<String>,

    /// Working directory, passed as `-C <dir>`
    current_dir: Option<PathBuf>,
}

impl GitCommand {
    /// Creates an empty git command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the repository directory the command operates on.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn full_args(&self) -> Vec<String> {
        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        full_args
    }

    /// Runs the command and returns its raw stdout.
    pub async fn execute(self) -> Result<String> {
        let git = which::which("git").map_err(|_| PlugmetaError::GitCommandError {
            operation: self.args.first().cloned().unwrap_or_default(),
            stderr: "git is not installed or not found in PATH".to_string(),
        })?;

        let full_args = self.full_args();
        tracing::debug!(target: "git", "Executing command: git {}", full_args.join(" "));

        let output = Command::new(&git)
            .args(&full_args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to execute git {}", full_args.join(" ")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            tracing::debug!(
                target: "git",
                "Command failed with exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            );
            return Err(PlugmetaError::GitCommandError {
                operation: self.args.first().cloned().unwrap_or_else(|| "unknown".to_string()),
                stderr,
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Runs the command and returns stdout trimmed.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.trim().to_string())
    }
}

// Convenience builders for the commands plugmeta uses

impl GitCommand {
    /// `git rev-parse --is-inside-work-tree`
    pub fn is_inside_work_tree() -> Self {
        Self::new().args(["rev-parse", "--is-inside-work-tree"])
    }

    /// Lists tracked and untracked-but-not-ignored files, NUL separated.
    pub fn ls_files() -> Self {
        Self::new().args([
            "ls-files",
            "-z",
            "--cached",
            "--others",
            "--exclude-standard",
            "--deduplicate",
        ])
    }
}
