//! scorekeep-server binary
//!
//! ```bash
//! SCOREKEEP_PORT=8000 SCOREKEEP_BACKEND=sqlite SCOREKEEP_DATA=./scores.db \
//! cargo run --package scorekeep-server
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use scorekeep_core::Limits;
use scorekeep_server::{http, logging, CliArgs, ResultService, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    if args.print_config {
        print!("{}", ServerConfig::default_toml());
        return Ok(());
    }

    let config = ServerConfig::load(&args)?;
    logging::init(&config.log_level)
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    info!(
        target: "scorekeep::http",
        backend = %config.store.backend,
        path = ?config.store.resolved_path(),
        "Opening leaderboard store"
    );
    let store = config
        .store
        .open(Limits::default())
        .context("failed to open leaderboard store")?;
    let service = ResultService::with_default_limit(store, config.default_limit);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    http::serve(listener, http::router(service), shutdown_signal()).await?;
    info!(target: "scorekeep::http", "Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "scorekeep::http", error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!(target: "scorekeep::http", "Shutdown requested");
}
