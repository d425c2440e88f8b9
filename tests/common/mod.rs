//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

pub use scorekeep::{Backend, LeaderboardStore, Limits, StoreConfig};
use tempfile::TempDir;

/// Open `backend` with its data file inside `dir`
///
/// fsync is off: these suites check semantics, not crash durability.
pub fn open_backend(backend: Backend, dir: &Path) -> Arc<dyn LeaderboardStore> {
    let file = match backend {
        Backend::Memory => None,
        Backend::Json => Some(dir.join("scores.json")),
        Backend::Sqlite => Some(dir.join("scores.db")),
    };
    StoreConfig {
        backend,
        path: file,
        sync: false,
        ..StoreConfig::default()
    }
    .open(Limits::default())
    .unwrap_or_else(|e| panic!("failed to open {} store: {}", backend, e))
}

/// One store per backend, sharing a temp dir that lives as long as the value
pub struct AllBackends {
    pub stores: Vec<(Backend, Arc<dyn LeaderboardStore>)>,
    _dir: TempDir,
}

impl AllBackends {
    pub fn open() -> Self {
        let dir = TempDir::new().unwrap();
        let stores = [Backend::Memory, Backend::Json, Backend::Sqlite]
            .into_iter()
            .map(|b| (b, open_backend(b, dir.path())))
            .collect();
        AllBackends { stores, _dir: dir }
    }

    /// Apply the same append to every store
    pub fn append(&self, level_id: &str, name: &str, time: f64) {
        for (backend, store) in &self.stores {
            store
                .append(level_id, name, time)
                .unwrap_or_else(|e| panic!("{}: append failed: {}", backend, e));
        }
    }
}

/// Names of a top-N result, for compact assertions
pub fn names(store: &dyn LeaderboardStore, level_id: &str, limit: usize) -> Vec<String> {
    store
        .top(level_id, limit)
        .unwrap()
        .iter()
        .map(|e| e.player_name().to_string())
        .collect()
}
