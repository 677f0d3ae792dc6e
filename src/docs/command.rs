//! Command builder for `ansible-doc` invocations
//!
//! Mirrors the git command builder: a fluent API that assembles arguments, runs the
//! tool with captured output, logs the command line and timing, and converts a
//! non-zero exit status into a typed error.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::PlugmetaError;
use crate::utils::platform::resolve_executable;

/// Builder for one `ansible-doc` invocation.
///
/// No timeout is applied unless [`with_timeout`](Self::with_timeout) is used; the tool
/// may legitimately take minutes on large collections.
///
/// ```rust,no_run
/// use plugmeta_cli::docs::command::DocCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let json = DocCommand::new("ansible-doc")
///     .args(["--json", "-t", "module", "--list", "community.general"])
///     .execute()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DocCommand {
    /// Executable name or path
    executable: PathBuf,

    /// Arguments passed to the tool
    args: Vec<String>,

    /// Maximum time to wait for completion (None = no timeout)
    timeout_duration: Option<Duration>,
}

impl DocCommand {
    /// Creates a command for the given executable.
    pub fn new(executable: impl AsRef<Path>) -> Self {
        Self {
            executable: executable.as_ref().to_path_buf(),
            args: Vec::new(),
            timeout_duration: None,
        }
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

    /// Sets a timeout (None for no timeout).
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Short name of the invocation mode, used in logs and errors.
    fn operation(&self) -> String {
        const MODES: [&str; 3] = ["--metadata-dump", "--list", "--version"];
        MODES
            .iter()
            .find(|mode| self.args.iter().any(|arg| arg == *mode))
            .map_or_else(|| "--json".to_string(), ToString::to_string)
    }

    /// Runs the command and returns stdout.
    ///
    /// # Errors
    ///
    /// - [`PlugmetaError::DocToolNotFound`] if the executable cannot be located
    /// - [`PlugmetaError::DocToolFailed`] on a non-zero exit status or timeout
    pub async fn execute(self) -> Result<String> {
        let start = std::time::Instant::now();
        let executable = resolve_executable(&self.executable)?;
        let operation = self.operation();

        let mut cmd = Command::new(&executable);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(
            target: "docs",
            "Executing command: {} {}",
            executable.display(),
            self.args.join(" ")
        );

        let output_future = cmd.output();
        let output = if let Some(duration) = self.timeout_duration {
            if let Ok(result) = timeout(duration, output_future).await {
                result.with_context(|| format!("Failed to execute {}", executable.display()))?
            } else {
                tracing::warn!(
                    target: "docs",
                    "Command timed out after {} seconds: ansible-doc {}",
                    duration.as_secs(),
                    operation
                );
                return Err(PlugmetaError::DocToolFailed {
                    operation,
                    stderr: format!("timed out after {} seconds", duration.as_secs()),
                }
                .into());
            }
        } else {
            output_future
                .await
                .with_context(|| format!("Failed to execute {}", executable.display()))?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            tracing::debug!(
                target: "docs",
                "Command failed with exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            );
            return Err(PlugmetaError::DocToolFailed {
                operation,
                stderr,
            }
            .into());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(target: "docs", "{}", stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(
                target: "docs::perf",
                "ansible-doc {} took {:.2}s",
                operation,
                elapsed.as_secs_f64()
            );
        } else {
            tracing::trace!(
                target: "docs::perf",
                "ansible-doc {} took {}ms",
                operation,
                elapsed.as_millis()
            );
        }

        String::from_utf8(output.stdout).map_err(|e| {
            PlugmetaError::DocOutputInvalid {
                operation,
                reason: format!("output is not UTF-8: {e}"),
            }
            .into()
        })
    }
}
