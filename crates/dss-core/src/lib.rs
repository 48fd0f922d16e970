//! # dss Core
//!
//! Pure primitives for dss: sealed secrets, the cipher engine, and the
//! identity types (paths and tokens) that the permission and storage crates
//! share.
//!
//! This crate contains no storage and no networking. The only I/O it performs
//! is reading a key file when asked to.
//!
//! ## Key Types
//!
//! - [`CipherEngine`] - Seals and opens secret payloads (ChaCha20-Poly1305)
//! - [`CipherKey`] - The process-wide 256-bit key, zeroized on drop
//! - [`SecretNonce`] - 96-bit nonce, freshly drawn for every seal
//! - [`Secret`] - A persisted record: path, owner, nonce, ciphertext
//! - [`SecretPath`] / [`Token`] - The key a secret lives under and the bearer
//!   credential presented by callers
//!
//! ## Sealing
//!
//! ```rust
//! use dss_core::{CipherEngine, CipherKey};
//!
//! let engine = CipherEngine::new(&CipherKey::generate());
//! let sealed = engine.seal(b"s3cr3t").unwrap();
//! assert_eq!(engine.open_sealed(&sealed).unwrap(), b"s3cr3t");
//! ```

pub mod cipher;
pub mod error;
pub mod types;

pub use cipher::{CipherEngine, CipherKey, KeyFingerprint, SecretNonce, KEY_LEN, NONCE_LEN};
pub use error::{CipherError, Result};
pub use types::{SealedSecret, Secret, SecretPath, Token};
