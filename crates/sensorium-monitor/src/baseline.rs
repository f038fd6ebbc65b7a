//! In-memory bookkeeping of lifecycle events.
//!
//! [`BaselineMonitor`] keeps plain running totals and short latency
//! histories, the way a host runtime tracks its own state. The hub delegates
//! to it, and the server exposes [`BaselineStats`] as JSON.

use crate::events::{TopicPartition, TpOffsets};
use crate::monitor::Monitor;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Default number of latency samples kept per history
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Key operation counts of one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    /// Values read
    pub keys_retrieved: u64,
    /// Values written
    pub keys_updated: u64,
    /// Keys deleted
    pub keys_deleted: u64,
}

/// Snapshot of everything the baseline monitor tracks.
///
/// Latencies are in seconds, newest last.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BaselineStats {
    /// Messages received but not yet acknowledged
    pub messages_active: i64,
    /// Messages received
    pub messages_received_total: u64,
    /// Messages received per topic
    pub messages_received_by_topic: BTreeMap<String, u64>,
    /// Messages delivered by the producer
    pub messages_sent: u64,
    /// Messages handed to the producer per topic
    pub messages_sent_by_topic: BTreeMap<String, u64>,
    /// Failed deliveries
    pub send_errors: u64,
    /// Recent delivery latencies
    pub send_latency: VecDeque<f64>,
    /// Stream events in flight
    pub events_active: i64,
    /// Stream events received
    pub events_total: u64,
    /// Stream events per stream label
    pub events_by_stream: BTreeMap<String, u64>,
    /// Recent event runtimes
    pub events_runtime: VecDeque<f64>,
    /// Average of `events_runtime`
    pub events_runtime_avg: f64,
    /// Key operations per table
    pub tables: BTreeMap<String, TableStats>,
    /// Completed assignments
    pub assignments_completed: u64,
    /// Failed assignments
    pub assignments_failed: u64,
    /// Recent assignment latencies
    pub assignment_latency: VecDeque<f64>,
    /// Rebalances started
    pub rebalances: u64,
    /// Rebalances that returned to the consumer
    pub rebalances_returned: u64,
    /// Rebalances that finished
    pub rebalances_ended: u64,
    /// Recent start-to-return latencies
    pub rebalance_return_latency: VecDeque<f64>,
    /// Recent start-to-end latencies
    pub rebalance_end_latency: VecDeque<f64>,
    /// Recent commit latencies
    pub commit_latency: VecDeque<f64>,
    /// Last committed offset per `topic:partition`
    pub tp_committed_offsets: BTreeMap<String, i64>,
    /// Last end offset per `topic:partition`
    pub tp_end_offsets: BTreeMap<String, i64>,
    /// Responses per HTTP status code
    pub http_response_codes: BTreeMap<u16, u64>,
    /// Recent HTTP latencies
    pub http_response_latency: VecDeque<f64>,
    /// Free-form counts
    pub metric_counts: BTreeMap<String, i64>,
}

/// Host-style bookkeeping monitor
#[derive(Debug)]
pub struct BaselineMonitor {
    stats: Mutex<BaselineStats>,
    max_history: usize,
}

impl Default for BaselineMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl BaselineMonitor {
    /// Create with [`DEFAULT_MAX_HISTORY`] samples per history
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_history(DEFAULT_MAX_HISTORY)
    }

    /// Create with a custom history length
    #[must_use]
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            stats: Mutex::new(BaselineStats::default()),
            max_history: max_history.max(1),
        }
    }

    /// Copy of the current statistics
    #[must_use]
    pub fn stats(&self) -> BaselineStats {
        let stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        let mut snapshot = stats.clone();
        snapshot.events_runtime_avg = average(&stats.events_runtime);
        snapshot
    }

    fn update(&self, f: impl FnOnce(&mut BaselineStats)) {
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut stats);
    }

    fn record(&self, history: &mut VecDeque<f64>, latency: Duration) {
        history.push_back(latency.as_secs_f64());
        while history.len() > self.max_history {
            history.pop_front();
        }
    }

    fn table(&self, table: &str, f: impl FnOnce(&mut TableStats)) {
        self.update(|s| f(s.tables.entry(table.to_string()).or_default()));
    }
}

fn average(samples: &VecDeque<f64>) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

impl Monitor for BaselineMonitor {
    fn on_message_in(&self, tp: &TopicPartition, _offset: i64) {
        self.update(|s| {
            s.messages_active = s.messages_active.saturating_add(1);
            s.messages_received_total += 1;
            *s.messages_received_by_topic.entry(tp.topic.clone()).or_default() += 1;
        });
    }

    fn on_message_out(&self, _tp: &TopicPartition, _offset: i64) {
        self.update(|s| s.messages_active = s.messages_active.saturating_sub(1));
    }

    fn on_stream_event_in(&self, _tp: &TopicPartition, _offset: i64, stream: &str) {
        self.update(|s| {
            s.events_active = s.events_active.saturating_add(1);
            s.events_total += 1;
            *s.events_by_stream.entry(stream.to_string()).or_default() += 1;
        });
    }

    fn on_stream_event_out(
        &self,
        _tp: &TopicPartition,
        _offset: i64,
        _stream: &str,
        runtime: Duration,
    ) {
        self.update(|s| {
            s.events_active = s.events_active.saturating_sub(1);
            self.record(&mut s.events_runtime, runtime);
        });
    }

    fn on_table_get(&self, table: &str) {
        self.table(table, |t| t.keys_retrieved += 1);
    }

    fn on_table_set(&self, table: &str) {
        self.table(table, |t| t.keys_updated += 1);
    }

    fn on_table_del(&self, table: &str) {
        self.table(table, |t| t.keys_deleted += 1);
    }

    fn on_send_initiated(&self, topic: &str) {
        self.update(|s| *s.messages_sent_by_topic.entry(topic.to_string()).or_default() += 1);
    }

    fn on_send_completed(&self, latency: Duration) {
        self.update(|s| {
            s.messages_sent += 1;
            self.record(&mut s.send_latency, latency);
        });
    }

    fn on_send_error(&self, _error: &str, _latency: Duration) {
        self.update(|s| s.send_errors += 1);
    }

    fn on_assignment_completed(&self, latency: Duration) {
        self.update(|s| {
            s.assignments_completed += 1;
            self.record(&mut s.assignment_latency, latency);
        });
    }

    fn on_assignment_error(&self, _error: &str, latency: Duration) {
        self.update(|s| {
            s.assignments_failed += 1;
            self.record(&mut s.assignment_latency, latency);
        });
    }

    fn on_rebalance_start(&self) {
        self.update(|s| s.rebalances += 1);
    }

    fn on_rebalance_return(&self, latency: Duration) {
        self.update(|s| {
            s.rebalances_returned += 1;
            self.record(&mut s.rebalance_return_latency, latency);
        });
    }

    fn on_rebalance_end(&self, latency: Duration) {
        self.update(|s| {
            s.rebalances_ended += 1;
            self.record(&mut s.rebalance_end_latency, latency);
        });
    }

    fn on_commit_completed(&self, latency: Duration) {
        self.update(|s| self.record(&mut s.commit_latency, latency));
    }

    fn on_tp_commit(&self, offsets: &TpOffsets) {
        self.update(|s| {
            for (tp, offset) in offsets {
                s.tp_committed_offsets.insert(tp.to_string(), *offset);
            }
        });
    }

    fn on_track_tp_end_offset(&self, tp: &TopicPartition, offset: i64) {
        self.update(|s| {
            s.tp_end_offsets.insert(tp.to_string(), offset);
        });
    }

    fn on_web_request_end(&self, status: Option<u16>, latency: Duration) {
        if let Some(code) = status {
            self.update(|s| *s.http_response_codes.entry(code).or_default() += 1);
        }
        self.update(|s| self.record(&mut s.http_response_latency, latency));
    }

    fn on_count(&self, name: &str, count: i64) {
        self.update(|s| {
            let total = s.metric_counts.entry(name.to_string()).or_default();
            *total = total.saturating_add(count);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_bookkeeping() {
        let monitor = BaselineMonitor::new();
        let tp = TopicPartition::new("foo", 3);

        monitor.on_message_in(&tp, 400);
        monitor.on_message_in(&tp, 401);
        monitor.on_message_out(&tp, 400);

        let stats = monitor.stats();
        assert_eq!(stats.messages_active, 1);
        assert_eq!(stats.messages_received_total, 2);
        assert_eq!(stats.messages_received_by_topic.get("foo"), Some(&2));
    }

    #[test]
    fn test_history_is_bounded() {
        let monitor = BaselineMonitor::with_max_history(3);
        let tp = TopicPartition::new("foo", 0);

        for ms in 1..=5 {
            monitor.on_stream_event_in(&tp, ms, "stream.foo.events");
            monitor.on_stream_event_out(&tp, ms, "stream.foo.events", Duration::from_millis(ms as u64 * 100));
        }

        let stats = monitor.stats();
        assert_eq!(stats.events_runtime, [0.3, 0.4, 0.5]);
        assert!((stats.events_runtime_avg - 0.4).abs() < 1e-9);
        assert_eq!(stats.events_active, 0);
        assert_eq!(stats.events_by_stream.get("stream.foo.events"), Some(&5));
    }

    #[test]
    fn test_tables_and_offsets() {
        let monitor = BaselineMonitor::new();
        monitor.on_table_get("table.t1");
        monitor.on_table_set("table.t1");
        monitor.on_table_set("table.t1");
        monitor.on_table_del("table.t2");

        let mut offsets = TpOffsets::new();
        offsets.insert(TopicPartition::new("foo", 0), 1001);
        monitor.on_tp_commit(&offsets);
        monitor.on_track_tp_end_offset(&TopicPartition::new("foo", 0), 4004);

        let stats = monitor.stats();
        assert_eq!(
            stats.tables.get("table.t1"),
            Some(&TableStats {
                keys_retrieved: 1,
                keys_updated: 2,
                keys_deleted: 0,
            })
        );
        assert_eq!(stats.tables["table.t2"].keys_deleted, 1);
        assert_eq!(stats.tp_committed_offsets.get("foo:0"), Some(&1001));
        assert_eq!(stats.tp_end_offsets.get("foo:0"), Some(&4004));
    }

    #[test]
    fn test_web_request_without_response_only_records_latency() {
        let monitor = BaselineMonitor::new();
        monitor.on_web_request_end(None, Duration::from_millis(20));
        monitor.on_web_request_end(Some(404), Duration::from_millis(30));

        let stats = monitor.stats();
        assert_eq!(stats.http_response_codes.len(), 1);
        assert_eq!(stats.http_response_codes.get(&404), Some(&1));
        assert_eq!(stats.http_response_latency.len(), 2);
    }

    #[test]
    fn test_running_totals_saturate() {
        let monitor = BaselineMonitor::new();
        monitor.on_count("big", i64::MAX);
        monitor.on_count("big", i64::MAX);
        monitor.on_count("small", i64::MIN);
        monitor.on_count("small", -1);

        let stats = monitor.stats();
        assert_eq!(stats.metric_counts["big"], i64::MAX);
        assert_eq!(stats.metric_counts["small"], i64::MIN);
    }

    #[test]
    fn test_rebalance_counts_outlive_history() {
        let monitor = BaselineMonitor::with_max_history(2);
        for _ in 0..5 {
            monitor.on_rebalance_start();
            monitor.on_rebalance_return(Duration::from_millis(10));
            monitor.on_rebalance_end(Duration::from_millis(20));
        }
        monitor.on_rebalance_start();

        let stats = monitor.stats();
        assert_eq!(stats.rebalances, 6);
        assert_eq!(stats.rebalances_returned, 5);
        assert_eq!(stats.rebalances_ended, 5);
        assert_eq!(stats.rebalance_return_latency.len(), 2);
        assert_eq!(stats.rebalance_end_latency.len(), 2);
    }

    #[test]
    fn test_stats_serialize() {
        let monitor = BaselineMonitor::new();
        monitor.on_count("metric_name", 3);
        monitor.on_web_request_end(Some(200), Duration::from_millis(5));

        let json = serde_json::to_value(monitor.stats()).unwrap();
        assert_eq!(json["metric_counts"]["metric_name"], 3);
        assert_eq!(json["http_response_codes"]["200"], 1);
    }
}
