//! scorekeep - per-level leaderboards with a small HTTP front end
//!
//! Players submit `(level, name, time)` results; anyone can read the fastest
//! entries for a level. Results are kept in one of three interchangeable
//! stores (SQLite, a JSON document, or memory) behind the
//! [`LeaderboardStore`] trait.
//!
//! # Quick Start
//!
//! ```ignore
//! use scorekeep::{LeaderboardStore, Limits, StoreConfig};
//!
//! let store = StoreConfig::default().open(Limits::default())?;
//! store.append("lvl1", "alice", 12.5)?;
//! store.append("lvl1", "bob", 9.3)?;
//!
//! let top = store.top("lvl1", 10)?;
//! assert_eq!(top[0].player_name(), "bob");
//! ```
//!
//! # Architecture
//!
//! - `scorekeep-core`: entry types, validation, ranking, the store trait
//! - `scorekeep-storage`: the three backends and the config that picks one
//! - `scorekeep-server`: `ResultService` and the axum router

pub use scorekeep_core::{
    top_n, CompletionTime, LeaderboardStore, Limits, ScoreEntry, StoreError, StoreResult,
    ValidationError, DEFAULT_TOP_LIMIT,
};
pub use scorekeep_server::{
    router, CliArgs, ConfigError, LevelSummary, ResultService, ScoreView, ServerConfig,
    ServiceError,
};
pub use scorekeep_storage::{
    Backend, JsonFileStore, MemoryStore, SqliteStore, StoreConfig, DEFAULT_LOCK_TIMEOUT,
};
