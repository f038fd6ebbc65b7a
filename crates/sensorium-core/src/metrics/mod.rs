//! Metric definitions, series storage and exposition.
//!
//! A [`MetricsRegistry`] is filled at startup, frozen into a [`SeriesStore`],
//! and rendered with [`render`].

pub mod definition;
pub mod export;
pub mod labels;
pub mod registry;
pub mod store;
pub mod types;

pub use definition::{Buckets, MetricDefinition, MetricHandle, MetricKind, DEFAULT_BUCKETS};
pub use export::{format_value, render, CONTENT_TYPE};
pub use labels::{normalize, LabelSet};
pub use registry::MetricsRegistry;
pub use store::{FamilySnapshot, SeriesStore, SeriesValue, CARDINALITY_WARN_THRESHOLD};
pub use types::{Counter, Gauge, Histogram, HistogramSnapshot};
