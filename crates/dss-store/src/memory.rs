//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use dss_core::{KeyFingerprint, Secret, SecretPath, Token};

use crate::error::{Result, StoreError};
use crate::traits::{Store, UpsertResult};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; a
/// record is always replaced whole, so readers never see a torn row.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Secrets indexed by path.
    secrets: HashMap<SecretPath, Secret>,

    key_fingerprint: Option<KeyFingerprint>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn owner_of(&self, path: &SecretPath) -> Result<Option<Token>> {
        Ok(self.read()?.secrets.get(path).map(|s| s.owner.clone()))
    }

    async fn get_secret(&self, path: &SecretPath) -> Result<Option<Secret>> {
        Ok(self.read()?.secrets.get(path).cloned())
    }

    async fn upsert_secret(&self, secret: &Secret) -> Result<UpsertResult> {
        let mut inner = self.write()?;

        match inner.secrets.insert(secret.path.clone(), secret.clone()) {
            Some(_) => Ok(UpsertResult::Updated),
            None => Ok(UpsertResult::Inserted),
        }
    }

    async fn delete_secret(&self, path: &SecretPath) -> Result<bool> {
        Ok(self.write()?.secrets.remove(path).is_some())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.read()?.secrets.len())
    }

    async fn key_fingerprint(&self) -> Result<Option<KeyFingerprint>> {
        Ok(self.read()?.key_fingerprint)
    }

    async fn record_key_fingerprint(&self, fingerprint: &KeyFingerprint) -> Result<()> {
        self.write()?.key_fingerprint = Some(*fingerprint);
        Ok(())
    }
}
