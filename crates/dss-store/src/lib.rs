//! # dss Store
//!
//! Storage abstraction for dss. Provides a trait-based interface for secret
//! persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The [`Store`] trait keeps the secret store storage-agnostic. The primary
//! implementation is [`SqliteStore`], with [`MemoryStore`] for testing.
//! Stores hold sealed records only; they never see plaintext or the key.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`StoreExt`] - Key fingerprint binding built on top of [`Store`]
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`UpsertResult`] - Whether an upsert created or replaced a row
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dss_store::{SqliteStore, Store};
//! use dss_core::SecretPath;
//!
//! async fn example() {
//!     let store = SqliteStore::open("secrets.db").unwrap();
//!     let owner = store.owner_of(&SecretPath::from("/app/db-pass")).await.unwrap();
//!     println!("owner: {:?}", owner);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **One row per path**: `path` is the primary key.
//! - **Atomic upsert**: a concurrent insert of the same path becomes an
//!   update, never a duplicate-key error.
//! - **Idempotent delete**: deleting an absent path succeeds and reports
//!   that nothing was removed.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{KeyBinding, Store, StoreExt, UpsertResult};
