//! Lifecycle callback interface.
//!
//! Host runtimes report through these callbacks. The instrumentation hub
//! forwards every callback to an optional baseline implementation, then
//! (or first, for send initiation) applies its own metric updates. Latency
//! arguments are already measured by the hub from the start token.

use crate::events::{TopicPartition, TpOffsets};
use std::time::Duration;

/// Observer of stream-processing lifecycle events.
///
/// Every method has an empty default so implementations only override what
/// they track.
#[cfg_attr(test, mockall::automock)]
#[allow(unused_variables)]
pub trait Monitor: Send + Sync {
    /// Message received from a partition, before it reaches any stream
    fn on_message_in(&self, tp: &TopicPartition, offset: i64) {}

    /// Message fully acknowledged and ready to commit
    fn on_message_out(&self, tp: &TopicPartition, offset: i64) {}

    /// Stream started processing an event
    fn on_stream_event_in(&self, tp: &TopicPartition, offset: i64, stream: &str) {}

    /// Stream finished processing an event
    fn on_stream_event_out(
        &self,
        tp: &TopicPartition,
        offset: i64,
        stream: &str,
        runtime: Duration,
    ) {
    }

    /// Value read from a table
    fn on_table_get(&self, table: &str) {}

    /// Value written to a table
    fn on_table_set(&self, table: &str) {}

    /// Key deleted from a table
    fn on_table_del(&self, table: &str) {}

    /// Message added to the producer buffer
    fn on_send_initiated(&self, topic: &str) {}

    /// Producer delivered a message
    fn on_send_completed(&self, latency: Duration) {}

    /// Producer failed to deliver a message
    fn on_send_error(&self, error: &str, latency: Duration) {}

    /// Partition assignment started
    fn on_assignment_start(&self) {}

    /// Partition assignment finished
    fn on_assignment_completed(&self, latency: Duration) {}

    /// Partition assignment failed
    fn on_assignment_error(&self, error: &str, latency: Duration) {}

    /// Cluster rebalance started
    fn on_rebalance_start(&self) {}

    /// Consumer told the broker its assignment is done
    fn on_rebalance_return(&self, latency: Duration) {}

    /// Rebalance fully completed, recovery included
    fn on_rebalance_end(&self, latency: Duration) {}

    /// Consumer started committing offsets
    fn on_commit_initiated(&self) {}

    /// Consumer finished committing offsets
    fn on_commit_completed(&self, latency: Duration) {}

    /// Offsets committed per topic partition
    fn on_tp_commit(&self, offsets: &TpOffsets) {}

    /// New end offset seen for a topic partition
    fn on_track_tp_end_offset(&self, tp: &TopicPartition, offset: i64) {}

    /// Web server started handling a request
    fn on_web_request_start(&self) {}

    /// Web server finished a request; `status` is `None` without a response
    fn on_web_request_end(&self, status: Option<u16>, latency: Duration) {}

    /// Free-form named count
    fn on_count(&self, name: &str, count: i64) {}
}
