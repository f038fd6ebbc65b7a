//! Sensorium Monitor - Lifecycle instrumentation for stream processors
//!
//! This crate turns stream-processing lifecycle events into metrics:
//! - Monitor: callback interface implemented by observers
//! - BaselineMonitor: in-memory bookkeeping served as JSON
//! - InstrumentationHub: maps events onto the standard metric set
//! - Clock: time sources for start tokens and latencies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod baseline;
pub mod clock;
pub mod events;
pub mod hub;
pub mod monitor;
pub mod standard;

pub use baseline::{BaselineMonitor, BaselineStats, TableStats, DEFAULT_MAX_HISTORY};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use events::{AssignmentOutcome, StartToken, TableOperation, TopicPartition, TpOffsets};
pub use hub::{InstrumentationHub, FALLBACK_STATUS_CODE};
pub use monitor::Monitor;
pub use standard::{ProcessMetrics, StandardDefinition, StandardMetrics, STANDARD_DEFINITIONS};
