//! Monitor configuration
//!
//! Static settings handed to the instrumentation hub at construction.

use crate::error::{Error, Result};
use crate::metrics::labels::is_valid_metric_name;
use serde::{Deserialize, Serialize};

/// Metric naming and exposure settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Prefix for every metric name (may be empty)
    #[serde(default)]
    pub namespace: String,
    /// Second prefix segment (may be empty)
    #[serde(default)]
    pub subsystem: String,
    /// Reserved constant labels; not applied to any metric yet
    #[serde(default)]
    pub labels: Vec<String>,
    /// Path of the export endpoint
    #[serde(default = "default_path")]
    pub path: String,
    /// Register process collectors (start time, uptime) alongside the
    /// standard metrics. Off by default.
    #[serde(default)]
    pub default_collectors: bool,
}

fn default_path() -> String {
    "/metrics".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            subsystem: String::new(),
            labels: Vec::new(),
            path: default_path(),
            default_collectors: false,
        }
    }
}

impl MonitorConfig {
    /// Config with the given prefixes and defaults elsewhere
    #[must_use]
    pub fn with_prefix(namespace: impl Into<String>, subsystem: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            subsystem: subsystem.into(),
            ..Self::default()
        }
    }

    /// Check that prefixes form valid metric names and the path is absolute
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("namespace", &self.namespace), ("subsystem", &self.subsystem)] {
            if !value.is_empty() && !is_valid_metric_name(value) {
                return Err(Error::InvalidConfig {
                    field: field.to_string(),
                    message: format!("'{}' is not a valid metric name prefix", value),
                });
            }
        }

        if !self.path.starts_with('/') {
            return Err(Error::InvalidConfig {
                field: "path".to_string(),
                message: format!("'{}' must start with '/'", self.path),
            });
        }

        // Route patterns would capture instead of matching literally.
        if self.path.contains([':', '*']) {
            return Err(Error::InvalidConfig {
                field: "path".to_string(),
                message: format!("'{}' must not contain ':' or '*'", self.path),
            });
        }

        Ok(())
    }
}
