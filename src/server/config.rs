//! Server configuration types
//!
//! Contains all configuration structures for the Sensorium server.

use sensorium_core::MonitorConfig;
use sensorium_monitor::DEFAULT_MAX_HISTORY;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9108,
        }
    }
}

/// In-memory baseline statistics served at `/stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}
