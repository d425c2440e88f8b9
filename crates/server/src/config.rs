//! Server configuration via `scorekeep.toml`
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults (`0.0.0.0:8000`, SQLite at `scores.db`)
//! 2. An optional TOML file given with `--config`
//! 3. Command-line flags, or the matching `SCOREKEEP_*` environment variables

use std::path::{Path, PathBuf};

use clap::Parser;
use scorekeep_core::limits::DEFAULT_MAX_TOP_LIMIT;
use scorekeep_core::DEFAULT_TOP_LIMIT;
use scorekeep_storage::{Backend, StoreConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// File that was requested
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid TOML for [`ServerConfig`]
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        /// File that was requested
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Command-line flags
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "scorekeep-server")]
#[command(about = "Per-level leaderboard service")]
pub struct CliArgs {
    /// TOML config file
    #[arg(long, env = "SCOREKEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen host
    #[arg(long, env = "SCOREKEEP_HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, env = "SCOREKEEP_PORT")]
    pub port: Option<u16>,

    /// Storage backend: sqlite, json or memory
    #[arg(long, env = "SCOREKEEP_BACKEND")]
    pub backend: Option<Backend>,

    /// Data file for the json or sqlite backend
    #[arg(long, env = "SCOREKEEP_DATA")]
    pub data: Option<PathBuf>,

    /// Log filter, e.g. "info" or "scorekeep=debug"
    #[arg(long, env = "SCOREKEEP_LOG")]
    pub log_level: Option<String>,

    /// Print the default config file and exit
    #[arg(long)]
    pub print_config: bool,
}

/// Server configuration
///
/// # Example
///
/// ```toml
/// host = "0.0.0.0"
/// port = 8000
/// log_level = "info"
/// default_limit = 10
///
/// [store]
/// backend = "sqlite"
/// path = "scores.db"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Entries returned by a query without `limit`, and the largest `limit` accepted
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Storage backend
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_limit() -> usize {
    DEFAULT_TOP_LIMIT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            default_limit: default_limit(),
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# scorekeep server configuration
#
# Listen address (default 0.0.0.0:8000)
host = "0.0.0.0"
port = 8000

# Log filter when RUST_LOG is not set, e.g. "info" or "scorekeep=debug"
log_level = "info"

# Entries returned by GET /results/{level} without ?limit (max 100)
default_limit = 10

[store]
# Backend: "sqlite" (default), "json" or "memory"
#   "sqlite" = indexed table, WAL journal
#   "json"   = one document rewritten atomically on every submit
#   "memory" = nothing survives a restart
backend = "sqlite"

# Data file (default scores.db for sqlite, scores.json for json)
# path = "scores.db"

# Longest wait for a lock or a busy database, in milliseconds
lock_timeout_ms = 5000

# fsync every write before acknowledging it
sync = true
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ServerConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the `--config` file, then flags and environment
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Overwrite fields that were given on the command line
    pub fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(backend) = args.backend {
            if backend != self.store.backend {
                // A path configured for another backend would be the wrong format
                self.store.path = None;
            }
            self.store.backend = backend;
        }
        if let Some(data) = &args.data {
            self.store.path = Some(data.clone());
        }
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
    }

    /// Check ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_limit == 0 || self.default_limit > DEFAULT_MAX_TOP_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "default_limit must be between 1 and {}, got {}",
                DEFAULT_MAX_TOP_LIMIT, self.default_limit
            )));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host cannot be empty".to_string()));
        }
        Ok(())
    }

    /// `host:port` for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
