//! `sensorium render`

use crate::server::{build_state, load_config, validate_config};
use anyhow::{Context, Result};
use std::io::Write;

/// Write one exposition render to stdout
pub fn run() -> Result<()> {
    let config = load_config()?;
    validate_config(&config)?;
    let state = build_state(&config)?;

    let body = state.hub.export().context("Failed to render metrics")?;
    std::io::stdout()
        .lock()
        .write_all(&body)
        .context("Failed to write to stdout")?;
    Ok(())
}
