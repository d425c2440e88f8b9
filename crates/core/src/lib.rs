//! Core types and traits for scorekeep
//!
//! This crate defines the foundational types used throughout the system:
//! - CompletionTime: validated, finite, non-negative seconds
//! - ScoreEntry: one immutable (level, player, time) record
//! - Limits: input bounds enforced by every store
//! - Error: `ValidationError` and `StoreError`
//! - Ranking: bounded top-N selection with stable tie order
//! - Traits: the `LeaderboardStore` abstraction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;
pub mod ranking;
pub mod traits;
pub mod types;

pub use error::{StoreError, StoreResult, ValidationError};
pub use limits::{Limits, DEFAULT_TOP_LIMIT};
pub use ranking::top_n;
pub use traits::LeaderboardStore;
pub use types::{CompletionTime, ScoreEntry};
