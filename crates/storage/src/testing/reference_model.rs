//! Reference model for tracking expected leaderboard state
//!
//! The reference model keeps every appended entry in plain vectors and
//! computes top-N with a full stable sort, independently of the heap used by
//! the stores. Tests drive a store and the model with the same operations and
//! compare the results.
//!
//! # Example
//!
//! ```ignore
//! use scorekeep_storage::testing::ReferenceModel;
//!
//! let mut model = ReferenceModel::new();
//! model.append("lvl1", "alice", 12.5);
//! store.append("lvl1", "alice", 12.5)?;
//!
//! let mismatches = model.compare_top("lvl1", 10, &store.top("lvl1", 10)?);
//! assert!(mismatches.is_empty());
//! ```

use std::collections::HashMap;

use scorekeep_core::ScoreEntry;

/// Expected leaderboard state
#[derive(Debug, Default)]
pub struct ReferenceModel {
    /// level -> (name, time) in insertion order
    levels: HashMap<String, Vec<(String, f64)>>,
    /// Appends recorded so far
    appended: usize,
}

/// Difference between the model and a store's answer
#[derive(Debug, Clone, PartialEq)]
pub enum TopMismatch {
    /// Result lengths differ
    Length {
        /// Expected number of entries
        expected: usize,
        /// Number the store returned
        actual: usize,
    },
    /// Entry at `rank` differs
    Entry {
        /// Zero-based position in the result
        rank: usize,
        /// Expected (name, time)
        expected: (String, f64),
        /// What the store returned
        actual: (String, f64),
    },
}

impl ReferenceModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an append the store accepted
    pub fn append(&mut self, level_id: &str, name: &str, time: f64) {
        self.levels
            .entry(level_id.to_string())
            .or_default()
            .push((name.to_string(), time));
        self.appended += 1;
    }

    /// Expected `top(level_id, limit)`
    pub fn top(&self, level_id: &str, limit: usize) -> Vec<(String, f64)> {
        let mut entries = self.levels.get(level_id).cloned().unwrap_or_default();
        // sort_by is stable, so equal times keep insertion order
        entries.sort_by(|a, b| a.1.total_cmp(&b.1));
        entries.truncate(limit);
        entries
    }

    /// Expected `count(level_id)`
    pub fn count(&self, level_id: &str) -> usize {
        self.levels.get(level_id).map_or(0, Vec::len)
    }

    /// Expected `levels()`
    pub fn levels(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.levels.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Total appends recorded
    pub fn appended(&self) -> usize {
        self.appended
    }

    /// Compare a store's `top` answer against the model
    pub fn compare_top(
        &self,
        level_id: &str,
        limit: usize,
        actual: &[ScoreEntry],
    ) -> Vec<TopMismatch> {
        let expected = self.top(level_id, limit);
        let mut mismatches = Vec::new();

        if expected.len() != actual.len() {
            mismatches.push(TopMismatch::Length {
                expected: expected.len(),
                actual: actual.len(),
            });
        }

        for (rank, (exp, act)) in expected.iter().zip(actual.iter()).enumerate() {
            let act = (act.player_name().to_string(), act.time_seconds());
            if exp.0 != act.0 || exp.1 != act.1 {
                mismatches.push(TopMismatch::Entry {
                    rank,
                    expected: exp.clone(),
                    actual: act,
                });
            }
        }
        mismatches
    }
}
