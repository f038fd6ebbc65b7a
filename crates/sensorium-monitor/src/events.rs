//! Plain data carried by lifecycle events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A topic partition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicPartition {
    /// Topic name
    pub topic: String,
    /// Partition number
    pub partition: i32,
}

impl TopicPartition {
    /// Create a topic partition
    #[must_use]
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.topic, self.partition)
    }
}

/// Committed offsets per topic partition
pub type TpOffsets = BTreeMap<TopicPartition, i64>;

/// Opaque timestamp returned by a start handler.
///
/// Pass it unchanged to the matching end handler. It owns nothing, so
/// dropping it (a lost end event) only loses one latency observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StartToken {
    started: Duration,
}

impl StartToken {
    /// Token for a clock reading
    #[must_use]
    pub fn at(started: Duration) -> Self {
        Self { started }
    }

    /// Clock reading at start
    #[must_use]
    pub fn started(&self) -> Duration {
        self.started
    }

    /// Time from start to `now`, zero if `now` is earlier
    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started)
    }
}

/// Key operation on a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableOperation {
    /// Value read
    Get,
    /// Value written
    Set,
    /// Key removed
    Del,
}

impl TableOperation {
    /// Label value used by the table operations metric
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Get => "keys_retrieved",
            Self::Set => "keys_updated",
            Self::Del => "keys_deleted",
        }
    }
}

/// Outcome of a partition assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOutcome {
    /// Assignment finished
    Completed,
    /// Assignment failed
    Error,
}

impl AssignmentOutcome {
    /// Label value used by the assignment operations metric
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}
