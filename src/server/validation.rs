//! Production configuration validation
//!
//! Exposure checks for production deployments.

use super::config::AppConfig;
use super::loader::environment;
use anyhow::{Context, Result};
use tracing::warn;

/// Validate configuration; hard errors for unusable settings, warnings for
/// risky ones in production
pub fn validate_config(config: &AppConfig) -> Result<()> {
    config
        .monitor
        .validate()
        .context("Invalid [monitor] configuration")?;

    if config.monitor.path == "/health" || config.monitor.path == "/stats" {
        anyhow::bail!(
            "monitor.path '{}' collides with a built-in endpoint",
            config.monitor.path
        );
    }

    if !config.monitor.labels.is_empty() {
        warn!(
            labels = ?config.monitor.labels,
            "monitor.labels is reserved and currently not applied to any metric"
        );
    }

    let is_production = environment().eq_ignore_ascii_case("production");
    if is_production && config.server.host == "0.0.0.0" {
        warn!(
            "SECURITY WARNING: Exporter is binding to all interfaces (0.0.0.0) in production. \
             Make sure only the scraper can reach port {}.",
            config.server.port
        );
    }

    Ok(())
}
