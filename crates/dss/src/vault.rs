//! The secret store: privilege checks in front of sealed persistence.
//!
//! Every write, read and delete passes through [`SecretStore`]. It brings
//! together the storage backend, the cipher engine and the privilege
//! resolver, all injected at construction.

use tokio::sync::Mutex;

use dss_core::{CipherEngine, SealedSecret, Secret, SecretPath, Token};
use dss_perms::{Decision, PrivilegeResolver};
use dss_store::{KeyBinding, SqliteStore, Store, StoreExt, UpsertResult};

use crate::config::VaultConfig;
use crate::error::{Result, VaultError};

/// The secret store.
///
/// Writes and deletes are serialized by a single writer lock held across the
/// owner lookup, the privilege check and the mutation, so a decision is
/// never made against a stale owner. Reads take no lock: they load the
/// record once and decide against that snapshot.
pub struct SecretStore<S: Store> {
    /// The storage backend.
    store: S,
    /// Seals plaintext on write.
    cipher: CipherEngine,
    /// Compiled grants.
    resolver: PrivilegeResolver,
    /// Single-writer discipline for Write and Delete.
    write_lock: Mutex<()>,
}

impl<S: Store> SecretStore<S> {
    /// Create a secret store from its components.
    pub fn new(store: S, cipher: CipherEngine, resolver: PrivilegeResolver) -> Self {
        Self {
            store,
            cipher,
            resolver,
            write_lock: Mutex::new(()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the cipher engine, for callers that open sealed secrets themselves.
    pub fn cipher(&self) -> &CipherEngine {
        &self.cipher
    }

    pub fn resolver(&self) -> &PrivilegeResolver {
        &self.resolver
    }

    /// Bind the store to this engine's key.
    ///
    /// Fails with a storage error if the store was sealed under another key.
    pub async fn bind_key(&self) -> Result<KeyBinding> {
        let fingerprint = self.cipher.key_fingerprint();
        let binding = self.store.bind_key_fingerprint(&fingerprint).await?;
        tracing::info!(key = ?fingerprint, ?binding, "bound secret store to key");
        Ok(binding)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Seal `plaintext` and store it at `path`.
    ///
    /// On success the writing token becomes the owner of the secret.
    pub async fn write(&self, path: &SecretPath, plaintext: &[u8], token: &Token) -> Result<()> {
        if token.is_empty() {
            return Err(VaultError::AuthorizationDenied);
        }

        let _guard = self.write_lock.lock().await;

        let owner = self.store.owner_of(path).await.map_err(storage_failure(path))?;
        if let Decision::Deny = self.resolver.check_write(path, token, owner.as_ref()) {
            tracing::debug!(%path, %token, "write denied");
            return Err(VaultError::AuthorizationDenied);
        }

        let sealed = self.cipher.seal(plaintext)?;
        let secret = Secret::new(path.clone(), token.clone(), sealed);

        let result = self
            .store
            .upsert_secret(&secret)
            .await
            .map_err(storage_failure(path))?;

        match result {
            UpsertResult::Inserted => tracing::info!(%path, %token, "secret created"),
            UpsertResult::Updated => tracing::info!(%path, %token, "secret updated"),
        }
        Ok(())
    }

    /// Return the sealed secret at `path`.
    ///
    /// A missing path is reported as [`VaultError::AuthorizationDenied`] so
    /// that unauthorized tokens cannot probe which paths exist.
    pub async fn read(&self, path: &SecretPath, token: &Token) -> Result<SealedSecret> {
        if token.is_empty() {
            return Err(VaultError::AuthorizationDenied);
        }

        let Some(secret) = self
            .store
            .get_secret(path)
            .await
            .map_err(storage_failure(path))?
        else {
            tracing::debug!(%path, %token, "read of unclaimed path denied");
            return Err(VaultError::AuthorizationDenied);
        };

        if let Decision::Deny = self.resolver.check_read(path, token, Some(&secret.owner)) {
            tracing::debug!(%path, %token, "read denied");
            return Err(VaultError::AuthorizationDenied);
        }

        Ok(secret.sealed())
    }

    /// [`read`](Self::read), then open the sealed secret.
    pub async fn read_plaintext(&self, path: &SecretPath, token: &Token) -> Result<Vec<u8>> {
        let sealed = self.read(path, token).await?;
        self.cipher.open_sealed(&sealed).map_err(|e| {
            tracing::error!(%path, error = %e, "stored secret failed authentication");
            VaultError::from(e)
        })
    }

    /// Delete the secret at `path`.
    ///
    /// Requires write privilege. Deleting an absent path the token could
    /// write is a successful no-op.
    pub async fn delete(&self, path: &SecretPath, token: &Token) -> Result<()> {
        if token.is_empty() {
            return Err(VaultError::AuthorizationDenied);
        }

        let _guard = self.write_lock.lock().await;

        let owner = self.store.owner_of(path).await.map_err(storage_failure(path))?;
        if let Decision::Deny = self.resolver.check_write(path, token, owner.as_ref()) {
            tracing::debug!(%path, %token, "delete denied");
            return Err(VaultError::AuthorizationDenied);
        }

        let removed = self
            .store
            .delete_secret(path)
            .await
            .map_err(storage_failure(path))?;

        if removed {
            tracing::info!(%path, %token, "secret deleted");
        } else {
            tracing::debug!(%path, %token, "delete of absent path");
        }
        Ok(())
    }
}

impl SecretStore<SqliteStore> {
    /// Build a secret store from configuration.
    ///
    /// Loads grants and key, opens (and migrates) the database, and binds it
    /// to the key fingerprint.
    ///
    /// An ephemeral key is never bound. Opening a database already bound to
    /// a configured key without `key_file` is a configuration error.
    pub async fn open(config: &VaultConfig) -> Result<Self> {
        let grants = config.resolve_grants()?;
        let key = config.cipher_key()?;
        let store = SqliteStore::open(&config.database)?;

        let resolver = PrivilegeResolver::new(&grants);
        if resolver.malformed_patterns() > 0 {
            tracing::warn!(
                malformed = resolver.malformed_patterns(),
                "grant table contains malformed patterns"
            );
        }

        let vault = Self::new(store, CipherEngine::new(&key), resolver);
        if !config.is_ephemeral_key() {
            vault.bind_key().await?;
        } else if let Some(bound) = vault.store.key_fingerprint().await? {
            return Err(VaultError::Config(format!(
                "database {} is bound to key {:?}; set key_file to that key",
                config.database.display(),
                bound
            )));
        }
        Ok(vault)
    }
}

/// Log a storage error for `path` and wrap it.
fn storage_failure(path: &SecretPath) -> impl FnOnce(dss_store::StoreError) -> VaultError + '_ {
    move |e| {
        tracing::error!(%path, error = %e, "storage failure");
        VaultError::Storage(e)
    }
}
