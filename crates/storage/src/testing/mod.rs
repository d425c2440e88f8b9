//! Testing utilities for leaderboard backends
//!
//! - **Conformance**: checks every `LeaderboardStore` backend must pass
//! - **Reference Model**: plain in-memory model for expected state tracking
//!
//! # Example
//!
//! ```ignore
//! use scorekeep_storage::testing::{conformance, ReferenceModel};
//!
//! // Run the shared suite against a backend
//! conformance::run_all(|| Arc::new(MemoryStore::new()));
//!
//! // Track expected state with reference model
//! let mut model = ReferenceModel::new();
//! model.append("lvl1", "alice", 12.5);
//! ```

pub mod conformance;
mod reference_model;

pub use reference_model::{ReferenceModel, TopMismatch};
