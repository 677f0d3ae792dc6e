//! Test utilities for plugmeta
//!
//! Helpers for exercising the plugin pipeline without an Ansible installation:
//! - [`FakeDocRunner`] stands in for `ansible-doc`, answering from a closure and
//!   recording every invocation
//! - [`CollectionFixture`] and [`CoreFixture`] lay out throwaway project trees
//! - [`init_test_logging`] routes `tracing` output into the test harness
//!
//! # Example
//!
//! ```rust,no_run
//! use plugmeta_cli::test_utils::{CollectionFixture, FakeDocRunner};
//!
//! let fixture = CollectionFixture::new("ns", "coll").unwrap();
//! fixture.add_module("cloud/ec2.py").unwrap();
//!
//! let runner = FakeDocRunner::new(|args| {
//!     assert_eq!(args[0], "--metadata-dump");
//!     Ok(r#"{"all": {}}"#.to_string())
//! });
//! ```

pub mod fixtures;

pub use fixtures::{CollectionFixture, CoreFixture};

use anyhow::Result;
use std::sync::{Arc, Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::PlugmetaError;
use crate::docs::DocToolRunner;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise `RUST_LOG`;
/// with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=plugins=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

type Handler = dyn Fn(&[String]) -> Result<String> + Send + Sync;

/// A scripted `ansible-doc`.
///
/// Clones share the invocation log, so a test can hand one clone to a loader and
/// inspect the calls through another.
#[derive(Clone)]
pub struct FakeDocRunner {
    handler: Arc<Handler>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeDocRunner {
    /// Answers every invocation with `handler(args)`.
    pub fn new(handler: impl Fn(&[String]) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every invocation as if `ansible-doc` exited with `stderr`.
    pub fn failing(stderr: &str) -> Self {
        let stderr = stderr.to_string();
        Self::new(move |_| {
            Err(PlugmetaError::DocToolFailed {
                operation: "--json".to_string(),
                stderr: stderr.clone(),
            }
            .into())
        })
    }

    /// Arguments of every invocation so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Number of invocations so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }
}

impl std::fmt::Debug for FakeDocRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeDocRunner").field("calls", &self.call_count()).finish()
    }
}

impl DocToolRunner for FakeDocRunner {
    async fn run(&self, args: Vec<String>) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(args.clone());
        }
        (self.handler)(&args)
    }
}
