//! Access-control configuration.
//!
//! Loaded from JSON. Every field has a default, so `{}` is a valid config
//! describing an in-memory store seeded with the standard catalog.
//!
//! ```json
//! {
//!   "database": { "path": "/var/lib/kbspace/access.db", "busy_timeout_ms": 2000 },
//!   "sequence_base": 1,
//!   "credential_ttl_secs": 3600,
//!   "seed_defaults": true
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use kbspace_store::StoreOptions;

use crate::error::{AccessError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub database: DatabaseConfig,

    /// First value handed out by a sequence that does not exist yet.
    pub sequence_base: i64,

    /// Lifetime of issued credentials. `None` issues credentials that do
    /// not expire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_ttl_secs: Option<u64>,

    /// Seed the standard commands and resource tree on open.
    pub seed_defaults: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            sequence_base: kbspace_core::DEFAULT_BASE,
            credential_ttl_secs: None,
            seed_defaults: true,
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. In-memory when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// How long to wait on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5000,
        }
    }
}

impl AccessConfig {
    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AccessError::Config(e.to_string()))
    }

    /// Read and parse a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AccessError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Options for the storage backend.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            sequence_base: self.sequence_base,
            busy_timeout: Duration::from_millis(self.database.busy_timeout_ms),
        }
    }

    /// Credential lifetime in milliseconds.
    pub fn credential_ttl_millis(&self) -> Option<i64> {
        self.credential_ttl_secs
            .map(|secs| i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX))
    }
}
