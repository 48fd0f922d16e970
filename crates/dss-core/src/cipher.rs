//! The cipher engine: authenticated encryption of secret payloads.
//!
//! ChaCha20-Poly1305 with a single process-wide 256-bit key and a fresh
//! random 96-bit nonce per seal. No associated data is bound.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CipherError, Result};
use crate::types::SealedSecret;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 12;

const FINGERPRINT_CONTEXT: &str = "dss 2024-06 cipher key fingerprint v1";

/// A 256-bit symmetric key.
///
/// Held in memory only and zeroized on drop. `Debug` prints the fingerprint,
/// never the key bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey([u8; KEY_LEN]);

impl CipherKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a key from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = hex::decode(s.trim()).map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        if bytes.len() != KEY_LEN {
            let len = bytes.len();
            bytes.zeroize();
            return Err(CipherError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_LEN, len
            )));
        }
        let mut arr = [0u8; KEY_LEN];
        arr.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self(arr))
    }

    /// Load a hex-encoded key from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut contents = std::fs::read_to_string(path).map_err(|source| CipherError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;
        let key = Self::from_hex(&contents);
        contents.zeroize();
        key
    }

    /// Fingerprint of this key, safe to persist and log.
    pub fn fingerprint(&self) -> KeyFingerprint {
        KeyFingerprint(blake3::derive_key(FINGERPRINT_CONTEXT, &self.0))
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherKey({:?})", self.fingerprint())
    }
}

/// Blake3-derived fingerprint of a [`CipherKey`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyFingerprint(pub [u8; 32]);

impl KeyFingerprint {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for KeyFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyFingerprint({})", &self.to_hex()[..16])
    }
}

/// A 96-bit nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecretNonce(pub [u8; NONCE_LEN]);

impl SecretNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, rejecting any length other than [`NONCE_LEN`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; NONCE_LEN] = bytes.try_into().map_err(|_| CipherError::InvalidNonce {
            expected: NONCE_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

/// Seals and opens secret payloads under one key.
///
/// Constructed once at startup and shared; it has no state besides the key
/// schedule, so `seal` and `open` are safe to call concurrently.
pub struct CipherEngine {
    cipher: ChaCha20Poly1305,
    fingerprint: KeyFingerprint,
}

impl CipherEngine {
    /// Create an engine for the given key.
    pub fn new(key: &CipherKey) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key.0)),
            fingerprint: key.fingerprint(),
        }
    }

    /// Fingerprint of the key this engine was built with.
    pub fn key_fingerprint(&self) -> KeyFingerprint {
        self.fingerprint
    }

    /// Encrypt `plaintext` under a freshly generated nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<SealedSecret> {
        let nonce = SecretNonce::generate();
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce.0), plaintext)
            .map_err(|_| CipherError::Seal)?;

        Ok(SealedSecret {
            ciphertext: Bytes::from(ciphertext),
            nonce,
        })
    }

    /// Decrypt `ciphertext` sealed under `nonce`.
    ///
    /// Fails with [`CipherError::Open`] if the tag does not verify.
    pub fn open(&self, ciphertext: &[u8], nonce: &SecretNonce) -> Result<Vec<u8>> {
        self.cipher
            .decrypt(Nonce::from_slice(&nonce.0), ciphertext)
            .map_err(|_| CipherError::Open)
    }

    /// Decrypt with a nonce given as raw bytes, as read back from storage.
    pub fn open_raw(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
        let nonce = SecretNonce::from_slice(nonce)?;
        self.open(ciphertext, &nonce)
    }

    /// Decrypt the output of [`CipherEngine::seal`].
    pub fn open_sealed(&self, sealed: &SealedSecret) -> Result<Vec<u8>> {
        self.open(&sealed.ciphertext, &sealed.nonce)
    }
}

impl fmt::Debug for CipherEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherEngine")
            .field("key", &self.fingerprint)
            .finish()
    }
}
