//! The leaderboard store abstraction
//!
//! This trait lets the service layer swap the in-memory, JSON-file and SQLite
//! backends without knowing which one it talks to.
//!
//! Thread safety: all methods must be safe to call concurrently from multiple
//! threads (requires Send + Sync).

use crate::error::StoreResult;
use crate::limits::{Limits, DEFAULT_TOP_LIMIT};
use crate::types::ScoreEntry;

/// Durable, concurrency-safe collection of per-level score entries
///
/// # Contract
///
/// - `append` is atomic: a concurrent `top` sees the entry entirely or not at
///   all, and concurrent appends to the same level never lose an entry.
/// - `append` returns only once the entry is in the backing store.
/// - `top` reflects every append that returned before it was called.
/// - `top` output is ascending by time; equal times keep insertion order.
/// - An unknown level is not an error: `top` returns an empty vector.
pub trait LeaderboardStore: Send + Sync {
    /// Record a completion of `level_id` by `player_name`
    ///
    /// # Errors
    ///
    /// - `StoreError::Validation` if any input violates [`Limits`] or the time
    ///   is negative or not finite. Nothing is written.
    /// - `StoreError::Unavailable` on I/O failure or lock timeout.
    /// - `StoreError::Corrupt` if the backing store is damaged.
    fn append(&self, level_id: &str, player_name: &str, time_seconds: f64) -> StoreResult<()>;

    /// Fastest `limit` entries for `level_id`, ascending
    ///
    /// # Errors
    ///
    /// - `StoreError::Validation` if `limit` is zero or above
    ///   `Limits::max_top_limit`, or the level id is malformed.
    /// - `StoreError::Unavailable` / `StoreError::Corrupt` as for `append`.
    fn top(&self, level_id: &str, limit: usize) -> StoreResult<Vec<ScoreEntry>>;

    /// Number of entries recorded for `level_id`
    fn count(&self, level_id: &str) -> StoreResult<usize>;

    /// All level ids that have at least one entry, sorted
    fn levels(&self) -> StoreResult<Vec<String>>;

    /// Limits this store validates against
    fn limits(&self) -> &Limits;

    /// Short backend identifier for logs ("memory", "json", "sqlite")
    fn backend_name(&self) -> &'static str;

    /// `top` with the default leaderboard size
    fn top_default(&self, level_id: &str) -> StoreResult<Vec<ScoreEntry>> {
        self.top(level_id, DEFAULT_TOP_LIMIT)
    }
}
