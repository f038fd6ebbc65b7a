//! Sensorium - Prometheus instrumentation for stream processors
//!
//! CLI entry point for the Sensorium exporter.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod middleware;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "sensorium=info,tower_http=info".into()),
    );

    // SENSORIUM_LOG_FORMAT=json for structured logs
    let json_logs = std::env::var("SENSORIUM_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let cli = cli::Cli::parse();

    if matches!(cli.command, Some(cli::Commands::Serve)) {
        info!("Starting Sensorium v{}", env!("CARGO_PKG_VERSION"));
    }

    cli::run(cli).await
}
