//! Leaderboard integration suite
//!
//! Cross-backend behaviour: property tests against the reference model,
//! parity between backends, and concurrent use through `ResultService`.

#[path = "../common/mod.rs"]
mod common;

mod backend_parity;
mod concurrency;
mod properties;
