//! Test fixtures and helpers.
//!
//! The standard grant table used across the test suites:
//!
//! | token   | write           | read        |
//! |---------|-----------------|-------------|
//! | `alice` | `/app/*`        | `/shared/*` |
//! | `bob`   | `/shared/*`     |             |
//! | global  | `/tmp/*`        | `/pub/*`    |
//!
//! `mallory` holds no grants at all.

use std::sync::Once;

use dss_core::{CipherEngine, CipherKey, Token};
use dss_perms::{GrantTable, PrivilegeResolver};
use dss_store::{MemoryStore, SqliteStore};
use tracing_subscriber::EnvFilter;

/// Seed bytes for the fixture key.
pub const FIXTURE_KEY: [u8; 32] = [0x42; 32];

pub fn alice() -> Token {
    Token::new("alice-token")
}

pub fn bob() -> Token {
    Token::new("bob-token")
}

/// A token with no grants.
pub fn mallory() -> Token {
    Token::new("mallory-token")
}

/// The standard grant table described in the module docs.
pub fn grants() -> GrantTable {
    GrantTable::new()
        .grant_write(alice().as_str(), "/app/*")
        .grant_read(alice().as_str(), "/shared/*")
        .grant_write(bob().as_str(), "/shared/*")
        .global_write("/tmp/*")
        .global_read("/pub/*")
}

/// Components for a secret store under test.
pub struct TestFixture {
    pub key: CipherKey,
    pub grants: GrantTable,
}

impl TestFixture {
    /// Fixture key with the standard grant table.
    pub fn new() -> Self {
        Self::with_grants(grants())
    }

    /// Fixture key with custom grants.
    pub fn with_grants(grants: GrantTable) -> Self {
        Self {
            key: CipherKey::from_bytes(FIXTURE_KEY),
            grants,
        }
    }

    pub fn engine(&self) -> CipherEngine {
        CipherEngine::new(&self.key)
    }

    pub fn resolver(&self) -> PrivilegeResolver {
        PrivilegeResolver::new(&self.grants)
    }

    pub fn memory_store(&self) -> MemoryStore {
        MemoryStore::new()
    }

    /// An in-memory SQLite store, migrated.
    pub fn sqlite_store(&self) -> dss_store::Result<SqliteStore> {
        SqliteStore::open_memory()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

static TRACING: Once = Once::new();

/// Install a test-writer tracing subscriber, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
