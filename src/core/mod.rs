//! Core types shared across plugmeta: errors and user-facing error reporting.

pub mod error;

pub use error::{ErrorContext, PlugmetaError, user_friendly_error};
