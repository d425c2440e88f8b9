//! Error types for scorekeep
//!
//! Two layers of error are defined here:
//! - [`ValidationError`]: the caller supplied something malformed. Never retryable.
//! - [`StoreError`]: what a [`LeaderboardStore`](crate::LeaderboardStore) operation
//!   can fail with. Wraps validation failures and separates transient storage
//!   trouble (`Unavailable`) from a damaged backing store (`Corrupt`).
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Input rejected before it reaches storage
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Level identifier is empty or whitespace only
    #[error("level id cannot be empty")]
    EmptyLevelId,

    /// Level identifier exceeds the configured byte limit
    #[error("level id too long: {length} bytes (max {max})")]
    LevelIdTooLong {
        /// Actual length in bytes
        length: usize,
        /// Maximum allowed length in bytes
        max: usize,
    },

    /// Player name is empty or whitespace only
    #[error("player name cannot be empty")]
    EmptyPlayerName,

    /// Player name exceeds the configured byte limit
    #[error("player name too long: {length} bytes (max {max})")]
    PlayerNameTooLong {
        /// Actual length in bytes
        length: usize,
        /// Maximum allowed length in bytes
        max: usize,
    },

    /// Completion time could not be parsed as a number
    #[error("time is not a number: {raw:?}")]
    InvalidTime {
        /// The raw text that failed to parse
        raw: String,
    },

    /// Completion time is below zero
    #[error("time cannot be negative: {value}")]
    NegativeTime {
        /// The rejected value
        value: f64,
    },

    /// Completion time is NaN or infinite
    #[error("time must be finite")]
    NonFiniteTime,

    /// Requested top-N limit is out of range
    #[error("limit must be between 1 and {max}, got {requested}")]
    InvalidLimit {
        /// The requested limit
        requested: usize,
        /// Maximum allowed limit
        max: usize,
    },
}

/// Errors returned by leaderboard store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request was malformed; nothing was written
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Storage is temporarily unreachable (I/O failure, lock wait exceeded,
    /// connection lost). Safe for the caller to retry.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Description of the underlying failure
        reason: String,
    },

    /// The backing store is unreadable or inconsistent. Not retryable.
    #[error("store corrupt: {reason}")]
    Corrupt {
        /// Description of the detected damage
        reason: String,
    },
}

impl StoreError {
    /// Build an `Unavailable` error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreError::Unavailable {
            reason: reason.into(),
        }
    }

    /// Build a `Corrupt` error
    pub fn corrupt(reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }

    /// Whether the error was caused by bad input
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                StoreError::corrupt(e.to_string())
            }
            _ => StoreError::unavailable(e.to_string()),
        }
    }
}
