//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use dss_core::{KeyFingerprint, Secret, SecretNonce, SecretPath, Token};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{Store, UpsertResult};

const KEY_FINGERPRINT_META: &str = "key_fingerprint";

/// How long a statement waits on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex: every statement runs on the one
/// connection, so writes are serialized. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        migration::migrate(&mut conn)?;

        tracing::info!(path = %path.display(), journal_mode = %mode, "opened secret database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

// Helper to convert raw columns to a Secret
fn to_secret(path: SecretPath, owner: String, nonce: Vec<u8>, ciphertext: Vec<u8>) -> Result<Secret> {
    let nonce = SecretNonce::from_slice(&nonce)
        .map_err(|e| StoreError::InvalidData(format!("secret {}: {}", path, e)))?;

    Ok(Secret {
        path,
        owner: Token::new(owner),
        nonce,
        ciphertext: Bytes::from(ciphertext),
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn owner_of(&self, path: &SecretPath) -> Result<Option<Token>> {
        let path = path.clone();

        self.run(move |conn| {
            let owner: Option<String> = conn
                .query_row(
                    "SELECT owner FROM secrets WHERE path = ?1",
                    params![path.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            Ok(owner.map(Token::new))
        })
        .await
    }

    async fn get_secret(&self, path: &SecretPath) -> Result<Option<Secret>> {
        let path = path.clone();

        self.run(move |conn| {
            let row: Option<(String, Vec<u8>, Vec<u8>)> = conn
                .query_row(
                    "SELECT owner, nonce, ciphertext FROM secrets WHERE path = ?1",
                    params![path.as_str()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?;

            let Some((owner, nonce, ciphertext)) = row else {
                return Ok(None);
            };

            to_secret(path, owner, nonce, ciphertext).map(Some)
        })
        .await
    }

    async fn upsert_secret(&self, secret: &Secret) -> Result<UpsertResult> {
        let secret = secret.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let now = now_millis();

            let existed: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM secrets WHERE path = ?1)",
                params![secret.path.as_str()],
                |row| row.get(0),
            )?;

            // A single statement, so the row is replaced as a whole.
            tx.execute(
                "INSERT INTO secrets (path, owner, nonce, ciphertext, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(path) DO UPDATE SET
                    owner = excluded.owner,
                    nonce = excluded.nonce,
                    ciphertext = excluded.ciphertext,
                    updated_at = excluded.updated_at",
                params![
                    secret.path.as_str(),
                    secret.owner.as_str(),
                    secret.nonce.as_bytes().as_slice(),
                    &secret.ciphertext[..],
                    now,
                ],
            )?;

            tx.commit()?;

            Ok(if existed {
                UpsertResult::Updated
            } else {
                UpsertResult::Inserted
            })
        })
        .await
    }

    async fn delete_secret(&self, path: &SecretPath) -> Result<bool> {
        let path = path.clone();

        self.run(move |conn| {
            let removed = conn.execute(
                "DELETE FROM secrets WHERE path = ?1",
                params![path.as_str()],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn count(&self) -> Result<usize> {
        self.run(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM secrets", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    async fn key_fingerprint(&self) -> Result<Option<KeyFingerprint>> {
        self.run(|conn| {
            let value: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT value FROM vault_meta WHERE key = ?1",
                    params![KEY_FINGERPRINT_META],
                    |row| row.get(0),
                )
                .optional()?;

            value
                .map(|bytes| -> Result<KeyFingerprint> {
                    let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                        StoreError::InvalidData(format!(
                            "key fingerprint has {} bytes, expected 32",
                            bytes.len()
                        ))
                    })?;
                    Ok(KeyFingerprint::from_bytes(arr))
                })
                .transpose()
        })
        .await
    }

    async fn record_key_fingerprint(&self, fingerprint: &KeyFingerprint) -> Result<()> {
        let fingerprint = *fingerprint;

        self.run(move |conn| {
            conn.execute(
                "INSERT INTO vault_meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![KEY_FINGERPRINT_META, fingerprint.as_bytes().as_slice()],
            )?;
            Ok(())
        })
        .await
    }
}
