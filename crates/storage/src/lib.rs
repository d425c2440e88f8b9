//! Storage backends for the leaderboard
//!
//! This crate implements `LeaderboardStore` three ways:
//! - MemoryStore: DashMap of per-level logs, each behind its own RwLock
//! - JsonFileStore: one JSON document, rewritten atomically on every append
//! - SqliteStore: one indexed table in a WAL-mode SQLite database
//!
//! `StoreConfig` picks a backend at startup and returns it as
//! `Arc<dyn LeaderboardStore>`, so callers never name the concrete type.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod json_file;
pub mod memory;
pub mod sqlite;
pub mod testing;

pub use config::{Backend, StoreConfig, DEFAULT_LOCK_TIMEOUT};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
