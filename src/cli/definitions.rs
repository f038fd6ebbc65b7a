//! `sensorium definitions`

use crate::server::{build_state, load_config, validate_config};
use anyhow::{Context, Result};
use sensorium_core::metrics::{MetricDefinition, MetricKind};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DefinitionRow<'a> {
    name: String,
    kind: MetricKind,
    labels: &'a [String],
    help: &'a str,
}

impl<'a> From<&'a MetricDefinition> for DefinitionRow<'a> {
    fn from(definition: &'a MetricDefinition) -> Self {
        Self {
            name: definition.fq_name(),
            kind: definition.kind(),
            labels: definition.label_names(),
            help: definition.help(),
        }
    }
}

/// Print the registered metric table
pub fn run(json: bool) -> Result<()> {
    let config = load_config()?;
    validate_config(&config)?;
    let state = build_state(&config)?;

    let rows: Vec<DefinitionRow<'_>> = state
        .hub
        .store()
        .registry()
        .definitions()
        .iter()
        .map(DefinitionRow::from)
        .collect();

    if json {
        let output = serde_json::to_string_pretty(&rows).context("Failed to serialize definitions")?;
        println!("{}", output);
        return Ok(());
    }

    println!("{:<55} {:<10} {:<22} HELP", "NAME", "KIND", "LABELS");
    for row in &rows {
        println!(
            "{:<55} {:<10} {:<22} {}",
            row.name,
            row.kind.as_str(),
            row.labels.join(","),
            row.help
        );
    }
    println!("\n{} metrics", rows.len());
    Ok(())
}
