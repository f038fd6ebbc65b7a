//! Server initialization
//!
//! Builds the instrumentation hub from configuration and runs the HTTP
//! exporter until a shutdown signal arrives.

use super::config::AppConfig;
use super::loader::{environment, load_config};
use super::shutdown::wait_for_shutdown_signal;
use super::validation::validate_config;
use crate::api::{router, AppState};
use anyhow::{Context, Result};
use sensorium_monitor::{BaselineMonitor, InstrumentationHub};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Build the hub, and the baseline monitor when enabled
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let hub = InstrumentationHub::new(config.monitor.clone())
        .context("Failed to build instrumentation hub")?;

    let baseline = config
        .baseline
        .enabled
        .then(|| Arc::new(BaselineMonitor::with_max_history(config.baseline.max_history)));

    let hub = match &baseline {
        Some(baseline) => hub.with_baseline(baseline.clone()),
        None => hub,
    };

    Ok(AppState {
        hub: Arc::new(hub),
        baseline,
    })
}

/// Load configuration and serve until Ctrl+C or SIGTERM
pub async fn run() -> Result<()> {
    let config = load_config()?;
    validate_config(&config)?;
    info!(env = %environment(), "Configuration loaded");

    let state = build_state(&config)?;
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(
        "Metrics exporter listening on http://{}{}",
        addr, config.monitor.path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Sensorium shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state_with_baseline() {
        let state = build_state(&AppConfig::default()).unwrap();
        assert!(state.baseline.is_some());
        assert_eq!(state.hub.config().path, "/metrics");
    }

    #[test]
    fn test_build_state_without_baseline() {
        let mut config = AppConfig::default();
        config.baseline.enabled = false;
        let state = build_state(&config).unwrap();
        assert!(state.baseline.is_none());
    }

    #[test]
    fn test_build_state_rejects_bad_namespace() {
        let mut config = AppConfig::default();
        config.monitor.namespace = "not valid".to_string();
        assert!(build_state(&config).is_err());
    }
}
