//! Sensorium Core - Metrics Registry and Series Store
//!
//! This crate provides the metric plumbing behind the instrumentation hub:
//! - Metrics: definitions, the registry, lazily created labeled series
//! - Export: text exposition rendering of every realized series
//! - Config: naming and exposure settings for a monitor
//! - Error: the error taxonomy shared by the workspace

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod metrics;

pub use config::MonitorConfig;
pub use error::{Error, Result};
pub use metrics::{
    normalize, render, Buckets, LabelSet, MetricDefinition, MetricHandle, MetricKind,
    MetricsRegistry, SeriesStore, SeriesValue, CONTENT_TYPE,
};
