//! Access to the external documentation tool (`ansible-doc`)
//!
//! Everything that talks to `ansible-doc` goes through the [`DocToolRunner`] trait.
//! Production code uses [`AnsibleDocRunner`], which spawns the configured executable
//! via [`command::DocCommand`]; tests substitute a fake that records invocations and
//! answers from canned output, so the plugin pipeline can be exercised without an
//! Ansible installation.
//!
//! # Invocations
//!
//! | Purpose | Arguments |
//! |---|---|
//! | list plugins of a type | `--json -t <type> --list [--playbook-dir <dir>] [<fqcn>]` |
//! | fetch docs | `--json -t <type> [--playbook-dir <dir>] <name>...` |
//! | dump everything | `--metadata-dump [<fqcn>] [--playbook-dir <dir>]` |
//! | tool version | `--version` |

pub mod command;
pub mod version;

use anyhow::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use command::DocCommand;

/// Runs the documentation tool with a list of arguments and returns its stdout.
///
/// Implementations must fail (rather than return partial output) when the tool exits
/// unsuccessfully.
pub trait DocToolRunner {
    /// Runs the tool with `args`.
    fn run(&self, args: Vec<String>) -> impl Future<Output = Result<String>> + Send;
}

/// Runs a real `ansible-doc` executable.
#[derive(Debug, Clone)]
pub struct AnsibleDocRunner {
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl AnsibleDocRunner {
    /// Creates a runner for the given executable (a name on `PATH` or a path).
    pub fn new(executable: impl AsRef<Path>) -> Self {
        Self {
            executable: executable.as_ref().to_path_buf(),
            timeout: None,
        }
    }

    /// Limits every invocation to `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured executable.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl DocToolRunner for AnsibleDocRunner {
    async fn run(&self, args: Vec<String>) -> Result<String> {
        DocCommand::new(&self.executable).args(args).with_timeout(self.timeout).execute().await
    }
}
