//! Tracing subscriber setup
//!
//! `RUST_LOG` wins over the configured level. Noisy dependency targets are
//! capped at `warn` unless `RUST_LOG` says otherwise.

use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

const QUIET_TARGETS: [&str; 3] = ["hyper=warn", "tower=warn", "axum::rejection=warn"];

/// Build the filter: `RUST_LOG` if set, else `level` plus quiet defaults
pub fn filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut filter = EnvFilter::new(level);
    for directive in QUIET_TARGETS {
        if let Ok(parsed) = directive.parse::<Directive>() {
            filter = filter.add_directive(parsed);
        }
    }
    filter
}

/// Install the global subscriber
///
/// Fails if one is already installed.
pub fn init(level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    Registry::default()
        .with(filter(level))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()?;
    Ok(())
}
