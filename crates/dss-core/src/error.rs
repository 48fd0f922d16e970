//! Error types for dss core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the cipher engine and key handling.
///
/// Every variant is a hard failure for the operation that raised it. In
/// particular [`CipherError::Open`] never comes with partial plaintext.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Encryption failed.
    #[error("failed to seal secret")]
    Seal,

    /// Authentication tag did not verify (tampered data, wrong nonce or wrong key).
    #[error("failed to open secret: authentication failed")]
    Open,

    #[error("invalid nonce length: expected {expected} bytes, got {actual}")]
    InvalidNonce { expected: usize, actual: usize },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("failed to read key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for cipher operations.
pub type Result<T> = std::result::Result<T, CipherError>;
