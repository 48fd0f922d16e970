//! Error types for the secret store.

use dss_core::CipherError;
use dss_perms::PermsError;
use dss_store::StoreError;
use thiserror::Error;

/// Errors that can occur during secret store operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The token may not perform this operation, or (on read) the path does
    /// not exist. The two are deliberately indistinguishable.
    #[error("authorization denied")]
    AuthorizationDenied,

    /// Storage error. Never retried here.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    /// Seal or open failed.
    #[error("crypto failure: {0}")]
    Crypto(#[from] CipherError),

    /// Grant table could not be loaded.
    #[error("grant table error: {0}")]
    Grants(#[from] PermsError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification for the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthorizationDenied,
    StorageFailure,
    CryptoFailure,
    Configuration,
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::AuthorizationDenied => ErrorKind::AuthorizationDenied,
            VaultError::Storage(_) => ErrorKind::StorageFailure,
            VaultError::Crypto(_) => ErrorKind::CryptoFailure,
            VaultError::Grants(_) | VaultError::Config(_) => ErrorKind::Configuration,
        }
    }
}

/// Result type for secret store operations.
pub type Result<T> = std::result::Result<T, VaultError>;
