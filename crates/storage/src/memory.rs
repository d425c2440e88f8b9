//! In-memory leaderboard store
//!
//! Levels live in a `DashMap`, each behind its own `RwLock`:
//! - Appends to different levels never contend
//! - Appends to the same level are serialized by that level's write lock
//! - Readers take the level's read lock, so they never see a half-pushed entry
//!
//! Nothing is written to disk. Used for tests and throwaway deployments.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::RwLock;
use scorekeep_core::{top_n, LeaderboardStore, Limits, ScoreEntry, StoreError, StoreResult};
use tracing::debug;

use crate::config::DEFAULT_LOCK_TIMEOUT;

/// Entries for one level, in insertion order (index = insertion sequence)
#[derive(Debug, Default)]
struct LevelLog {
    entries: Vec<ScoreEntry>,
}

/// Volatile store keyed by level id
pub struct MemoryStore {
    levels: DashMap<String, Arc<RwLock<LevelLog>>>,
    limits: Limits,
    lock_timeout: Duration,
}

impl MemoryStore {
    /// Create an empty store with default limits
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Create an empty store with custom limits
    pub fn with_limits(limits: Limits) -> Self {
        MemoryStore {
            levels: DashMap::new(),
            limits,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Set how long a call may wait for a level lock
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    fn level(&self, level_id: &str) -> Option<Arc<RwLock<LevelLog>>> {
        self.levels.get(level_id).map(|log| Arc::clone(log.value()))
    }

    fn level_or_create(&self, level_id: &str) -> Arc<RwLock<LevelLog>> {
        if let Some(log) = self.level(level_id) {
            return log;
        }
        // Clone the Arc out so the shard lock is released before the level lock is taken
        Arc::clone(
            self.levels
                .entry(level_id.to_string())
                .or_default()
                .value(),
        )
    }

    fn lock_timed_out(&self, level_id: &str) -> StoreError {
        StoreError::unavailable(format!(
            "timed out after {:?} waiting for level '{}'",
            self.lock_timeout, level_id
        ))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardStore for MemoryStore {
    fn append(&self, level_id: &str, player_name: &str, time_seconds: f64) -> StoreResult<()> {
        let entry = ScoreEntry::new(level_id, player_name, time_seconds, &self.limits)?;

        let log = self.level_or_create(level_id);
        let mut log = log
            .try_write_for(self.lock_timeout)
            .ok_or_else(|| self.lock_timed_out(level_id))?;
        log.entries.push(entry);

        debug!(target: "scorekeep::store", backend = "memory", level_id, player_name, time_seconds, "Appended entry");
        Ok(())
    }

    fn top(&self, level_id: &str, limit: usize) -> StoreResult<Vec<ScoreEntry>> {
        self.limits.validate_level_id(level_id)?;
        self.limits.validate_top_limit(limit)?;

        let Some(log) = self.level(level_id) else {
            return Ok(Vec::new());
        };
        let log = log
            .try_read_for(self.lock_timeout)
            .ok_or_else(|| self.lock_timed_out(level_id))?;

        let ranked = log
            .entries
            .iter()
            .enumerate()
            .map(|(seq, entry)| (entry.time(), seq as u64, entry));
        Ok(top_n(ranked, limit).into_iter().cloned().collect())
    }

    fn count(&self, level_id: &str) -> StoreResult<usize> {
        self.limits.validate_level_id(level_id)?;
        let Some(log) = self.level(level_id) else {
            return Ok(0);
        };
        let log = log
            .try_read_for(self.lock_timeout)
            .ok_or_else(|| self.lock_timed_out(level_id))?;
        Ok(log.entries.len())
    }

    fn levels(&self) -> StoreResult<Vec<String>> {
        let snapshot: Vec<(String, Arc<RwLock<LevelLog>>)> = self
            .levels
            .iter()
            .map(|log| (log.key().clone(), Arc::clone(log.value())))
            .collect();

        let mut ids = Vec::with_capacity(snapshot.len());
        for (level_id, log) in snapshot {
            let log = log
                .try_read_for(self.lock_timeout)
                .ok_or_else(|| self.lock_timed_out(&level_id))?;
            // A level is created just before its first push; skip it until that lands
            if !log.entries.is_empty() {
                ids.push(level_id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
