//! Service configuration.
//!
//! Loaded once at startup from TOML, then overridden from the environment.
//!
//! ```toml
//! database = "/var/lib/dss/secrets.db"
//! key_file = "/etc/dss/key.hex"
//!
//! [grants]
//! write_global = ["/tmp/*"]
//! read_global = ["/pub/*"]
//!
//! [grants.write]
//! deploy-token = ["/app/*"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use dss_core::CipherKey;
use dss_perms::GrantTable;

use crate::error::{Result, VaultError};

/// Environment override for [`VaultConfig::database`].
pub const ENV_DATABASE: &str = "DSS_DATABASE";
/// Environment override for [`VaultConfig::key_file`].
pub const ENV_KEY_FILE: &str = "DSS_KEY_FILE";
/// Environment override for [`VaultConfig::grants_file`].
pub const ENV_GRANTS_FILE: &str = "DSS_GRANTS_FILE";

/// Configuration for a [`SecretStore`](crate::SecretStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// SQLite database file.
    pub database: PathBuf,

    /// Hex-encoded 256-bit key. Without one an ephemeral key is generated.
    pub key_file: Option<PathBuf>,

    /// Inline grants.
    pub grants: GrantTable,

    /// Separate grant file (`.toml` or `.json`). Replaces inline grants.
    pub grants_file: Option<PathBuf>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("secrets.db"),
            key_file: None,
            grants: GrantTable::default(),
            grants_file: None,
        }
    }
}

impl VaultConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VaultError::Config(format!("invalid TOML: {}", e)))
    }

    /// Load a TOML configuration file and apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VaultError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.merge_with_env();
        Ok(config)
    }

    /// Apply `DSS_*` environment overrides.
    pub fn merge_with_env(&mut self) {
        self.merge_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn merge_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(database) = lookup(ENV_DATABASE) {
            self.database = PathBuf::from(database);
        }
        if let Some(key_file) = lookup(ENV_KEY_FILE) {
            self.key_file = Some(PathBuf::from(key_file));
        }
        if let Some(grants_file) = lookup(ENV_GRANTS_FILE) {
            self.grants_file = Some(PathBuf::from(grants_file));
        }
    }

    /// The effective grant table.
    pub fn resolve_grants(&self) -> Result<GrantTable> {
        match &self.grants_file {
            Some(path) => Ok(GrantTable::load(path)?),
            None => Ok(self.grants.clone()),
        }
    }

    /// Whether [`cipher_key`](Self::cipher_key) generates a fresh key.
    pub fn is_ephemeral_key(&self) -> bool {
        self.key_file.is_none()
    }

    /// Load the configured key, or generate an ephemeral one.
    pub fn cipher_key(&self) -> Result<CipherKey> {
        match &self.key_file {
            Some(path) => CipherKey::load(path).map_err(|e| VaultError::Config(e.to_string())),
            None => {
                tracing::warn!(
                    "no key_file configured, using an ephemeral key; secrets written with it cannot be opened after restart"
                );
                Ok(CipherKey::generate())
            }
        }
    }
}
