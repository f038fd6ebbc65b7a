//! CLI module for Sensorium
//!
//! Provides commands:
//! - `serve`: Run the metrics exporter
//! - `definitions`: Print the metric table for the loaded configuration
//! - `render`: Print one exposition render to stdout

use clap::{Parser, Subcommand};

pub mod definitions;
pub mod render;

/// Sensorium metrics exporter CLI
#[derive(Parser, Debug)]
#[command(name = "sensorium")]
#[command(about = "Prometheus instrumentation for stream-processing applications")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the exporter
    Serve,
    /// List every metric with its fully-qualified name
    Definitions {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Render the exposition text once
    Render,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve) => crate::server::run().await,
        Some(Commands::Definitions { json }) => definitions::run(json),
        Some(Commands::Render) => render::run(),
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}
