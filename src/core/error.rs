//! Error handling for plugmeta
//!
//! This module provides the strongly-typed error enum used throughout the crate and
//! the user-facing error reporting used by the CLI. The design follows two rules:
//! 1. **Typed errors** for failures callers may want to match on (tool failures,
//!    unparseable versions, staging problems)
//! 2. **Friendly messages** with a short explanation and an actionable suggestion
//!    when an error reaches the terminal
//!
//! Library functions return [`anyhow::Result`] and wrap a [`PlugmetaError`] where the
//! failure mode is specific; plain I/O failures carry `.context(...)` instead.
//!
//! # Examples
//!
//! ```rust,no_run
//! use plugmeta_cli::core::{PlugmetaError, user_friendly_error};
//!
//! let error = anyhow::Error::from(PlugmetaError::DocToolNotFound {
//!     path: "ansible-doc".to_string(),
//! });
//! user_friendly_error(error).display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for plugmeta operations.
///
/// # Error Categories
///
/// ## Documentation tool
/// - [`DocToolNotFound`] - the `ansible-doc` executable cannot be located
/// - [`DocToolFailed`] - the tool exited with a non-zero status
/// - [`DocOutputInvalid`] - the tool produced output that is not the expected JSON
/// - [`ToolVersionUnparseable`] - no known `--version` format matched
///
/// ## Staging and version control
/// - [`IsolationFailed`] - the temporary collection tree could not be built
/// - [`GitCommandError`] - a git invocation failed
///
/// ## Configuration
/// - [`ConfigError`] - invalid project configuration
/// - [`MissingVersion`] - no release version was given or discoverable
///
/// [`DocToolNotFound`]: PlugmetaError::DocToolNotFound
/// [`DocToolFailed`]: PlugmetaError::DocToolFailed
/// [`DocOutputInvalid`]: PlugmetaError::DocOutputInvalid
/// [`ToolVersionUnparseable`]: PlugmetaError::ToolVersionUnparseable
/// [`IsolationFailed`]: PlugmetaError::IsolationFailed
/// [`GitCommandError`]: PlugmetaError::GitCommandError
/// [`ConfigError`]: PlugmetaError::ConfigError
/// [`MissingVersion`]: PlugmetaError::MissingVersion
#[derive(Error, Debug)]
pub enum PlugmetaError {
    /// The documentation tool executable could not be found.
    #[error("ansible-doc executable not found: {path}")]
    DocToolNotFound {
        /// The path or program name that was looked up
        path: String,
    },

    /// The documentation tool returned a non-zero exit code.
    ///
    /// # Fields
    /// - `operation`: The invocation mode that failed (e.g. `--list`, `--metadata-dump`)
    /// - `stderr`: The error output of the tool
    #[error("ansible-doc {operation} failed")]
    DocToolFailed {
        /// The invocation mode that failed
        operation: String,
        /// The error output from the tool
        stderr: String,
    },

    /// The documentation tool produced output that could not be interpreted.
    #[error("Unexpected ansible-doc {operation} output: {reason}")]
    DocOutputInvalid {
        /// The invocation mode whose output was rejected
        operation: String,
        /// Why the output was rejected
        reason: String,
    },

    /// Neither the host release string nor `ansible-doc --version` yielded a version.
    #[error("Cannot extract ansible-core version from ansible-doc --version output:\n{output}")]
    ToolVersionUnparseable {
        /// The raw `--version` output
        output: String,
    },

    /// Building the isolated collection copy failed.
    #[error("Failed to stage collection copy: {reason}")]
    IsolationFailed {
        /// The reason staging failed
        reason: String,
    },

    /// A git command returned a non-zero exit code.
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g. "ls-files")
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// No release version is available to key the plugin cache.
    #[error("No release version given and none could be read from galaxy.yml")]
    MissingVersion,

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error wrapper carrying user-facing details and a suggestion.
///
/// When displayed, errors show:
/// 1. **Error**: the main message in red
/// 2. **Details**: extra context in yellow (optional)
/// 3. **Suggestion**: what to try next in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: PlugmetaError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without details or suggestion.
    #[must_use]
    pub const fn new(error: PlugmetaError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognizes [`PlugmetaError`] variants and [`std::io::Error`] kinds and attaches
/// matching suggestions. Anything else keeps its full cause chain in the message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(plugmeta_error) = error.downcast_ref::<PlugmetaError>() {
        return create_error_context(plugmeta_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(PlugmetaError::Other {
                message: error.to_string(),
            })
            .with_suggestion("Check file ownership and permissions of the project directory");
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(PlugmetaError::Other {
        message,
    })
}

fn create_error_context(error: &PlugmetaError) -> ErrorContext {
    match error {
        PlugmetaError::DocToolNotFound {
            path,
        } => ErrorContext::new(PlugmetaError::DocToolNotFound {
            path: path.clone(),
        })
        .with_suggestion("Install ansible-core or pass --ansible-doc <path>")
        .with_details("Plugin metadata is extracted by running ansible-doc"),
        PlugmetaError::DocToolFailed {
            operation,
            stderr,
        } => ErrorContext::new(PlugmetaError::DocToolFailed {
            operation: operation.clone(),
            stderr: stderr.clone(),
        })
        .with_details(stderr.trim().to_string())
        .with_suggestion("Run the same ansible-doc command manually with -vvv to see the failure"),
        PlugmetaError::ToolVersionUnparseable {
            output,
        } => ErrorContext::new(PlugmetaError::ToolVersionUnparseable {
            output: output.clone(),
        })
        .with_suggestion("Pass --ansible-core-version to skip version detection"),
        PlugmetaError::IsolationFailed {
            reason,
        } => ErrorContext::new(PlugmetaError::IsolationFailed {
            reason: reason.clone(),
        })
        .with_suggestion("Set `vcs: none` in changelogs/config.yaml to copy the full tree"),
        PlugmetaError::GitCommandError {
            operation,
            stderr,
        } => ErrorContext::new(PlugmetaError::GitCommandError {
            operation: operation.clone(),
            stderr: stderr.clone(),
        })
        .with_details(stderr.trim().to_string()),
        PlugmetaError::MissingVersion => ErrorContext::new(PlugmetaError::MissingVersion)
            .with_suggestion("Pass --version <release>"),
        PlugmetaError::ConfigError {
            message,
        } => ErrorContext::new(PlugmetaError::ConfigError {
            message: message.clone(),
        }),
        other => ErrorContext::new(PlugmetaError::Other {
            message: other.to_string(),
        }),
    }
}
