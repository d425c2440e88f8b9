//! Store configuration
//!
//! Picks a backend and opens it. The server embeds [`StoreConfig`] in its own
//! TOML file under the `[store]` section:
//!
//! ```toml
//! [store]
//! # "sqlite" (default), "json" or "memory"
//! backend = "sqlite"
//! # Defaults to scores.db (sqlite) or scores.json (json)
//! path = "scores.db"
//! lock_timeout_ms = 5000
//! sync = true
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use scorekeep_core::{LeaderboardStore, Limits, StoreResult};
use tracing::info;

use crate::json_file::JsonFileStore;
use crate::memory::MemoryStore;
use crate::sqlite::SqliteStore;

/// Default wait for a lock or a busy database before giving up
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(5000);

/// Storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Volatile, process-local
    Memory,
    /// Single JSON document on disk
    Json,
    /// SQLite database file
    #[default]
    Sqlite,
}

impl Backend {
    /// File used when no path is configured
    pub fn default_path(&self) -> Option<PathBuf> {
        match self {
            Backend::Memory => None,
            Backend::Json => Some(PathBuf::from("scores.json")),
            Backend::Sqlite => Some(PathBuf::from("scores.db")),
        }
    }

    /// Lowercase name as used in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Json => "json",
            Backend::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "json" => Ok(Backend::Json),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(format!(
                "unknown backend '{}', expected \"sqlite\", \"json\" or \"memory\"",
                other
            )),
        }
    }
}

/// Backend selection and tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend to open
    #[serde(default)]
    pub backend: Backend,
    /// Backing file; `None` uses [`Backend::default_path`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Maximum wait for locks / a busy database, in milliseconds
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// fsync each write before acknowledging it
    #[serde(default = "default_sync")]
    pub sync: bool,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT.as_millis() as u64
}

fn default_sync() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: Backend::default(),
            path: None,
            lock_timeout_ms: default_lock_timeout_ms(),
            sync: default_sync(),
        }
    }
}

impl StoreConfig {
    /// In-memory store config, mostly for tests
    pub fn memory() -> Self {
        StoreConfig {
            backend: Backend::Memory,
            ..Default::default()
        }
    }

    /// Lock timeout as a `Duration`
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Configured path, or the backend's default
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| self.backend.default_path())
    }

    /// Open the configured backend
    ///
    /// # Errors
    ///
    /// `StoreError::Unavailable` if the file cannot be opened or locked,
    /// `StoreError::Corrupt` if existing contents cannot be read.
    pub fn open(&self, limits: Limits) -> StoreResult<Arc<dyn LeaderboardStore>> {
        let store: Arc<dyn LeaderboardStore> = match self.backend {
            Backend::Memory => Arc::new(
                MemoryStore::with_limits(limits).lock_timeout(self.lock_timeout()),
            ),
            Backend::Json => {
                let path = self.resolved_path().unwrap_or_else(|| PathBuf::from("scores.json"));
                Arc::new(JsonFileStore::open(path, limits, self.lock_timeout(), self.sync)?)
            }
            Backend::Sqlite => {
                let path = self.resolved_path().unwrap_or_else(|| PathBuf::from("scores.db"));
                Arc::new(SqliteStore::open(path, limits, self.lock_timeout(), self.sync)?)
            }
        };

        info!(
            target: "scorekeep::store",
            backend = store.backend_name(),
            path = ?self.resolved_path(),
            lock_timeout_ms = self.lock_timeout_ms,
            sync = self.sync,
            "Opened leaderboard store"
        );
        Ok(store)
    }
}
