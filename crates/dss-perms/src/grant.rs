//! The privilege grant table.
//!
//! Grants are configuration: loaded once at startup and read-only for the
//! lifetime of the process.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PermsError, Result};

/// Configured read and write grants.
///
/// `write` and `read` map a raw token string to the glob patterns that token
/// may write or read. `write_global` patterns let any token claim an
/// unclaimed path; `read_global` patterns let any token read.
///
/// ```toml
/// write_global = ["/tmp/*"]
/// read_global = ["/pub/*"]
///
/// [write]
/// deploy-token = ["/app/*"]
///
/// [read]
/// ci-token = ["/app/*", "/ci/?"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrantTable {
    /// Token -> patterns the token may write.
    pub write: BTreeMap<String, Vec<String>>,

    /// Patterns any token may write while the path is unclaimed.
    #[serde(alias = "writeGlobal")]
    pub write_global: Vec<String>,

    /// Token -> patterns the token may read.
    pub read: BTreeMap<String, Vec<String>>,

    /// Patterns any token may read.
    #[serde(alias = "readGlobal")]
    pub read_global: Vec<String>,
}

impl GrantTable {
    /// An empty table: nothing is granted beyond ownership.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token-specific write grant.
    pub fn grant_write(mut self, token: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.write.entry(token.into()).or_default().push(pattern.into());
        self
    }

    /// Add a token-specific read grant.
    pub fn grant_read(mut self, token: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.read.entry(token.into()).or_default().push(pattern.into());
        self
    }

    /// Add a global write grant (unclaimed paths only).
    pub fn global_write(mut self, pattern: impl Into<String>) -> Self {
        self.write_global.push(pattern.into());
        self
    }

    /// Add a global read grant.
    pub fn global_read(mut self, pattern: impl Into<String>) -> Self {
        self.read_global.push(pattern.into());
        self
    }

    /// Parse a table from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PermsError::Parse(e.to_string()))
    }

    /// Parse a table from JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| PermsError::Parse(e.to_string()))
    }

    /// Load a table from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PermsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(PermsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Total number of configured patterns.
    pub fn pattern_count(&self) -> usize {
        self.write.values().map(Vec::len).sum::<usize>()
            + self.read.values().map(Vec::len).sum::<usize>()
            + self.write_global.len()
            + self.read_global.len()
    }
}
