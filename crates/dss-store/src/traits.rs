//! Store trait: the abstract interface for secret persistence.
//!
//! This trait allows the secret store to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use dss_core::{KeyFingerprint, Secret, SecretPath, Token};

use crate::error::{Result, StoreError};

/// Result of upserting a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertResult {
    /// No row existed for the path; one was created.
    Inserted,
    /// An existing row had its owner, nonce and ciphertext replaced.
    Updated,
}

/// Outcome of binding a key fingerprint to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBinding {
    /// The store had no fingerprint; this one was recorded.
    Bound,
    /// The store already carried this fingerprint.
    Matched,
}

/// The Store trait: async interface for secret persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - A reader observes a row either fully before or fully after a write,
///   never a mix of old owner and new ciphertext.
/// - `upsert_secret` on an existing path replaces the row (last write wins).
/// - Stores perform no authorization. That is the secret store's job.
#[async_trait]
pub trait Store: Send + Sync {
    /// Current owner of `path`, `None` if the path is unclaimed.
    async fn owner_of(&self, path: &SecretPath) -> Result<Option<Token>>;

    /// The full record for `path`.
    async fn get_secret(&self, path: &SecretPath) -> Result<Option<Secret>>;

    /// Insert the record, or replace owner, nonce and ciphertext if a record
    /// already exists for its path.
    async fn upsert_secret(&self, secret: &Secret) -> Result<UpsertResult>;

    /// Remove the record for `path`. Returns whether a row was removed.
    async fn delete_secret(&self, path: &SecretPath) -> Result<bool>;

    /// Number of stored secrets.
    async fn count(&self) -> Result<usize>;

    /// The key fingerprint recorded for this store, if any.
    async fn key_fingerprint(&self) -> Result<Option<KeyFingerprint>>;

    /// Record the key fingerprint, replacing any previous one.
    async fn record_key_fingerprint(&self, fingerprint: &KeyFingerprint) -> Result<()>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Bind the store to a key.
    ///
    /// Records the fingerprint on first use; afterwards fails with
    /// [`StoreError::KeyMismatch`] if a different key is presented.
    fn bind_key_fingerprint(
        &self,
        fingerprint: &KeyFingerprint,
    ) -> impl std::future::Future<Output = Result<KeyBinding>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn bind_key_fingerprint(&self, fingerprint: &KeyFingerprint) -> Result<KeyBinding> {
        match self.key_fingerprint().await? {
            None => {
                self.record_key_fingerprint(fingerprint).await?;
                Ok(KeyBinding::Bound)
            }
            Some(stored) if stored == *fingerprint => Ok(KeyBinding::Matched),
            Some(stored) => Err(StoreError::KeyMismatch {
                stored,
                presented: *fingerprint,
            }),
        }
    }
}
