//! ResultService: request-to-store mapping
//!
//! Stateless apart from the shared store handle. Parses raw input, calls the
//! store, and turns every failure into a [`ServiceError`]. All methods are
//! synchronous; the HTTP layer runs them on the blocking pool.

use std::sync::Arc;

use scorekeep_core::{
    CompletionTime, LeaderboardStore, ScoreEntry, ValidationError, DEFAULT_TOP_LIMIT,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ServiceError;

/// One leaderboard row as sent to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreView {
    /// Player name
    pub name: String,
    /// Completion time in seconds
    pub time: f64,
}

impl From<&ScoreEntry> for ScoreView {
    fn from(entry: &ScoreEntry) -> Self {
        ScoreView {
            name: entry.player_name().to_string(),
            time: entry.time_seconds(),
        }
    }
}

/// Level with its number of recorded entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    /// Level id
    pub level_id: String,
    /// Entries recorded for the level
    pub entries: usize,
}

/// Mediates between HTTP requests and the leaderboard store
#[derive(Clone)]
pub struct ResultService {
    store: Arc<dyn LeaderboardStore>,
    default_limit: usize,
}

impl ResultService {
    /// Service returning the 10 fastest entries by default
    pub fn new(store: Arc<dyn LeaderboardStore>) -> Self {
        Self::with_default_limit(store, DEFAULT_TOP_LIMIT)
    }

    /// Service with a custom default (and maximum) page size
    ///
    /// Clamped to the store's own `max_top_limit`.
    pub fn with_default_limit(store: Arc<dyn LeaderboardStore>, default_limit: usize) -> Self {
        let default_limit = default_limit.clamp(1, store.limits().max_top_limit);
        ResultService {
            store,
            default_limit,
        }
    }

    /// Page size used when a query gives none
    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Name of the backing store
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Record a result whose time arrived as text
    ///
    /// Nothing is written if `time_raw` does not parse.
    pub fn submit(&self, level_id: &str, name: &str, time_raw: &str) -> Result<(), ServiceError> {
        let time = CompletionTime::parse(time_raw)?;
        self.submit_time(level_id, name, time.as_secs())
    }

    /// Record a result whose time is already numeric
    pub fn submit_time(&self, level_id: &str, name: &str, time: f64) -> Result<(), ServiceError> {
        self.store.append(level_id, name, time)?;
        debug!(target: "scorekeep::http", level_id, name, time, "Result recorded");
        Ok(())
    }

    /// Fastest entries for a level, ascending by time
    ///
    /// `limit` defaults to [`ResultService::default_limit`] and may not
    /// exceed it. An unknown level yields an empty list.
    pub fn query(&self, level_id: &str, limit: Option<usize>) -> Result<Vec<ScoreView>, ServiceError> {
        let limit = limit.unwrap_or(self.default_limit);
        if limit == 0 || limit > self.default_limit {
            return Err(ValidationError::InvalidLimit {
                requested: limit,
                max: self.default_limit,
            }
            .into());
        }

        let entries = self.store.top(level_id, limit)?;
        Ok(entries.iter().map(ScoreView::from).collect())
    }

    /// Every level with at least one entry
    pub fn levels(&self) -> Result<Vec<LevelSummary>, ServiceError> {
        self.store
            .levels()?
            .into_iter()
            .map(|level_id| {
                let entries = self.store.count(&level_id)?;
                Ok(LevelSummary { level_id, entries })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{STORE_UNAVAILABLE, VALIDATION_ERROR};
    use axum::http::StatusCode;
    use scorekeep_storage::MemoryStore;

    fn service() -> ResultService {
        ResultService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_submit_then_query() {
        let svc = service();
        svc.submit("lvl1", "alice", "12.5").unwrap();
        svc.submit("lvl1", "bob", "9.3").unwrap();

        assert_eq!(
            svc.query("lvl1", None).unwrap(),
            vec![
                ScoreView {
                    name: "bob".into(),
                    time: 9.3
                },
                ScoreView {
                    name: "alice".into(),
                    time: 12.5
                },
            ]
        );
    }

    #[test]
    fn test_unparseable_time_writes_nothing() {
        let svc = service();
        let err = svc.submit("lvl1", "alice", "abc").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), VALIDATION_ERROR);
        assert!(svc.query("lvl1", None).unwrap().is_empty());
        assert!(svc.levels().unwrap().is_empty());
    }

    #[test]
    fn test_query_empty_level() {
        assert!(service().query("nobody-played-this", None).unwrap().is_empty());
    }

    #[test]
    fn test_query_limit_bounds() {
        let svc = service();
        for i in 0..15 {
            svc.submit_time("lvl1", &format!("p{}", i), i as f64).unwrap();
        }
        assert_eq!(svc.query("lvl1", None).unwrap().len(), 10);
        assert_eq!(svc.query("lvl1", Some(3)).unwrap().len(), 3);
        assert_eq!(svc.query("lvl1", Some(0)).unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(svc.query("lvl1", Some(11)).unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_default_limit_clamped_to_store() {
        let svc = ResultService::with_default_limit(Arc::new(MemoryStore::new()), 10_000);
        assert_eq!(svc.default_limit(), 100);
        let svc = ResultService::with_default_limit(Arc::new(MemoryStore::new()), 0);
        assert_eq!(svc.default_limit(), 1);
    }

    #[test]
    fn test_levels_summary() {
        let svc = service();
        svc.submit_time("b", "x", 1.0).unwrap();
        svc.submit_time("a", "y", 2.0).unwrap();
        svc.submit_time("b", "z", 3.0).unwrap();
        assert_eq!(
            svc.levels().unwrap(),
            vec![
                LevelSummary {
                    level_id: "a".into(),
                    entries: 1
                },
                LevelSummary {
                    level_id: "b".into(),
                    entries: 2
                },
            ]
        );
    }

    #[test]
    fn test_store_timeout_is_retryable() {
        use std::time::Duration;

        struct Stalled(MemoryStore);
        impl LeaderboardStore for Stalled {
            fn append(&self, _: &str, _: &str, _: f64) -> scorekeep_core::StoreResult<()> {
                Err(scorekeep_core::StoreError::unavailable(format!(
                    "timed out after {:?}",
                    Duration::from_millis(5)
                )))
            }
            fn top(&self, l: &str, n: usize) -> scorekeep_core::StoreResult<Vec<ScoreEntry>> {
                self.0.top(l, n)
            }
            fn count(&self, l: &str) -> scorekeep_core::StoreResult<usize> {
                self.0.count(l)
            }
            fn levels(&self) -> scorekeep_core::StoreResult<Vec<String>> {
                self.0.levels()
            }
            fn limits(&self) -> &scorekeep_core::Limits {
                self.0.limits()
            }
            fn backend_name(&self) -> &'static str {
                "stalled"
            }
        }

        let svc = ResultService::new(Arc::new(Stalled(MemoryStore::new())));
        let err = svc.submit("lvl1", "alice", "1.0").unwrap_err();
        assert_eq!(err.code(), STORE_UNAVAILABLE);
        assert!(err.is_retryable());
        assert_eq!(svc.backend_name(), "stalled");
    }
}
