//! Identity and record types shared across crates.

use std::fmt;

use bytes::Bytes;

use crate::cipher::SecretNonce;

/// The unique key a secret is stored under.
///
/// Paths are hierarchical (`/app/db-pass`) and matched against grant globs.
/// The core stores them exactly as given; normalization belongs to whoever
/// extracts the path from a request.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecretPath(String);

impl SecretPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretPath({})", self.0)
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SecretPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SecretPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for SecretPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// A bearer token.
///
/// Tokens double as owner identities. `Debug` and `Display` only ever show a
/// short fingerprint so a token cannot leak through logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token string. Only for persistence and comparison.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First 8 hex chars of the Blake3 hash of the token.
    pub fn fingerprint(&self) -> String {
        let hash = blake3::hash(self.0.as_bytes());
        hex::encode(&hash.as_bytes()[..4])
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({}…)", self.fingerprint())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}…", self.fingerprint())
    }
}

impl From<&str> for Token {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl From<String> for Token {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Output of a seal: the ciphertext (with its tag appended) and the nonce
/// needed to open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    pub ciphertext: Bytes,
    pub nonce: SecretNonce,
}

/// A persisted secret record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    /// Primary key. No two secrets share a path.
    pub path: SecretPath,

    /// The token that created the secret or most recently wrote it.
    pub owner: Token,

    /// Nonce used when `ciphertext` was sealed.
    pub nonce: SecretNonce,

    /// The sealed payload.
    pub ciphertext: Bytes,
}

impl Secret {
    /// Build a record from the output of a seal.
    pub fn new(path: SecretPath, owner: Token, sealed: SealedSecret) -> Self {
        Self {
            path,
            owner,
            nonce: sealed.nonce,
            ciphertext: sealed.ciphertext,
        }
    }

    /// The `(ciphertext, nonce)` pair, without the ownership metadata.
    pub fn sealed(&self) -> SealedSecret {
        SealedSecret {
            ciphertext: self.ciphertext.clone(),
            nonce: self.nonce,
        }
    }
}
