//! Error types for the permissions module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a grant table.
///
/// Malformed glob patterns are not errors: they are logged and never match.
#[derive(Debug, Error)]
pub enum PermsError {
    #[error("failed to read grant file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse grant table: {0}")]
    Parse(String),

    #[error("unsupported grant file format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
