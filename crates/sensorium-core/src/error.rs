//! Error types for sensorium-core
//!
//! Registration and configuration errors are fatal at startup. Store errors
//! indicate a miswired caller: the instrumentation hub logs them instead of
//! propagating.

use crate::metrics::MetricKind;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing dependency, unusable settings)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid configuration field
    #[error("invalid configuration: {field}: {message}")]
    InvalidConfig {
        /// Config field name
        field: String,
        /// Detailed message
        message: String,
    },

    /// Fully-qualified metric name already registered
    #[error("duplicate metric: {name}")]
    DuplicateMetric {
        /// Fully-qualified name
        name: String,
    },

    /// Definition rejected by the registry
    #[error("invalid definition for {name}: {reason}")]
    InvalidDefinition {
        /// Metric name as given
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Handle or name not known to this registry
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// Label value count differs from the definition's schema
    #[error("metric {metric} expects {expected} label values, got {actual}")]
    InvalidLabelArity {
        /// Fully-qualified name
        metric: String,
        /// Schema length
        expected: usize,
        /// Values supplied
        actual: usize,
    },

    /// Operation not valid for the metric's kind
    #[error("metric {metric} is a {actual}, not a {expected}")]
    KindMismatch {
        /// Fully-qualified name
        metric: String,
        /// Kind the operation needs
        expected: MetricKind,
        /// Kind of the metric
        actual: MetricKind,
    },

    /// Negative or NaN delta passed to an increment
    #[error("metric {metric} received invalid delta {delta}")]
    NegativeDelta {
        /// Fully-qualified name
        metric: String,
        /// The rejected delta
        delta: f64,
    },

    /// Exposition rendering failed
    #[error("export error: {0}")]
    Export(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error points at a programming mistake rather than
    /// runtime conditions
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Error::DuplicateMetric { .. }
                | Error::InvalidDefinition { .. }
                | Error::UnknownMetric(_)
                | Error::InvalidLabelArity { .. }
                | Error::KindMismatch { .. }
        )
    }
}
