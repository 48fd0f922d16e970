//! # dss
//!
//! A minimal secret store: callers write and read opaque secrets under a
//! hierarchical path, authenticated by a bearer token.
//!
//! ## Overview
//!
//! [`SecretStore`] is the single gate through which every write, read and
//! delete passes. For each call it:
//!
//! 1. Looks up the current owner of the path in the [`Store`](store::Store)
//! 2. Asks the [`PrivilegeResolver`](perms::PrivilegeResolver) for a decision
//! 3. On write, seals the plaintext with the [`CipherEngine`](core::CipherEngine)
//!    and upserts the record
//!
//! Reads return the sealed `(ciphertext, nonce)` pair; decryption is up to
//! the caller ([`SecretStore::read_plaintext`] does both).
//!
//! ## Key Concepts
//!
//! - **Owner**: the token that created or last wrote a secret. It may always
//!   read and update it.
//! - **Grant**: configured glob patterns a token (or everyone) may read or
//!   write.
//! - **Unclaimed path**: no secret exists yet. Global write grants only apply
//!   here; the first writer becomes owner.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dss::{SecretStore, VaultConfig};
//! use dss::core::{SecretPath, Token};
//!
//! async fn example() {
//!     let config = VaultConfig::load("dss.toml").unwrap();
//!     let vault = SecretStore::open(&config).await.unwrap();
//!
//!     let path = SecretPath::from("/app/db-pass");
//!     let token = Token::from("deploy-token");
//!
//!     vault.write(&path, b"s3cr3t", &token).await.unwrap();
//!     let plaintext = vault.read_plaintext(&path, &token).await.unwrap();
//!     assert_eq!(plaintext, b"s3cr3t");
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `dss::core` - Cipher engine, paths, tokens, records
//! - `dss::store` - Storage abstraction and SQLite
//! - `dss::perms` - Grant tables and the privilege resolver

pub mod config;
pub mod error;
pub mod vault;

pub use dss_core as core;
pub use dss_perms as perms;
pub use dss_store as store;

pub use config::VaultConfig;
pub use error::{ErrorKind, Result, VaultError};
pub use vault::SecretStore;

pub use dss_core::{CipherEngine, CipherKey, SealedSecret, Secret, SecretPath, Token};
pub use dss_perms::{GrantTable, PrivilegeResolver};
