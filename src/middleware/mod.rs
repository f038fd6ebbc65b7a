//! Middleware module for Sensorium HTTP server
//!
//! Provides:
//! - Request instrumentation (status codes and latency into the hub)

pub mod request_metrics;

pub use request_metrics::RequestMetricsLayer;
