//! HTTP front end for the scorekeep leaderboard
//!
//! - `ResultService`: maps submit/query requests onto a `LeaderboardStore`
//! - `http`: axum router exposing the service
//! - `config`: TOML file plus CLI/environment overrides
//! - `logging`: tracing subscriber setup for the binary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod service;

pub use config::{CliArgs, ConfigError, ServerConfig};
pub use error::ServiceError;
pub use http::router;
pub use service::{LevelSummary, ResultService, ScoreView};
