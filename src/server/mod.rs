//! Server module for Sensorium
//!
//! Contains the exporter initialization and runtime logic.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures for the server and monitor
//! - `loader`: Configuration loading from files and environment
//! - `validation`: Configuration validation
//! - `shutdown`: Ctrl+C / SIGTERM handling
//! - `init`: Hub construction and the run loop

pub mod config;
mod init;
mod loader;
mod shutdown;
mod validation;

// Re-export public API
pub use init::{build_state, run};
pub use loader::load_config;
pub use validation::validate_config;
