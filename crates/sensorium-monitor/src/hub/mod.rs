//! Instrumentation hub
//!
//! Receives lifecycle events, forwards them to an optional baseline
//! [`Monitor`], and keeps the standard metric set up to date.

use crate::clock::{Clock, MonotonicClock};
use crate::events::{AssignmentOutcome, StartToken, TableOperation, TopicPartition, TpOffsets};
use crate::monitor::Monitor;
use crate::standard::{ProcessMetrics, StandardMetrics};
use sensorium_core::metrics::{normalize, render, MetricsRegistry, SeriesStore};
use sensorium_core::{MonitorConfig, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};


/// Status code recorded when a web request ends without a response
pub const FALLBACK_STATUS_CODE: u16 = 500;

/// Label value for a stream's short label
#[must_use]
pub fn stream_label(shortlabel: &str) -> String {
    format!("stream.{}.events", normalize(shortlabel))
}

/// Label value for a table name
#[must_use]
pub fn table_label(name: &str) -> String {
    format!("table.{}", normalize(name))
}

/// Label value for a topic sent to by the producer
#[must_use]
pub fn send_topic_label(topic: &str) -> String {
    format!("topic.{topic}")
}

/// Maps lifecycle events onto the standard metric set.
///
/// Handlers never fail and never block on I/O. They can be called from any
/// number of threads at once.
pub struct InstrumentationHub {
    config: MonitorConfig,
    store: Arc<SeriesStore>,
    metrics: StandardMetrics,
    process: Option<ProcessMetrics>,
    baseline: Option<Arc<dyn Monitor>>,
    clock: Arc<dyn Clock>,
    created: Duration,
}

impl std::fmt::Debug for InstrumentationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstrumentationHub")
            .field("config", &self.config)
            .field("metrics", &self.store.registry().len())
            .field("baseline", &self.baseline.is_some())
            .field("clock", &self.clock)
            .finish()
    }
}

impl InstrumentationHub {
    /// Validate `config`, register the standard metrics and build the store
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;

        let mut registry = MetricsRegistry::new();
        let metrics = StandardMetrics::register(&mut registry, &config)?;
        let process = if config.default_collectors {
            Some(ProcessMetrics::register(&mut registry)?)
        } else {
            None
        };

        let store = Arc::new(SeriesStore::new(registry));
        if let Some(process) = process {
            let start = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
            store.gauge_set(process.start_time, &[], start)?;
        }

        info!(
            namespace = %config.namespace,
            subsystem = %config.subsystem,
            metrics = store.registry().len(),
            default_collectors = config.default_collectors,
            "Instrumentation hub ready"
        );

        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
        let created = clock.now();
        Ok(Self {
            config,
            store,
            metrics,
            process,
            baseline: None,
            clock,
            created,
        })
    }

    /// Forward every event to `baseline` as well
    #[must_use]
    pub fn with_baseline(mut self, baseline: Arc<dyn Monitor>) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Measure latencies with `clock`
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.created = clock.now();
        self.clock = clock;
        self
    }

    /// Configuration the hub was built with
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Series store holding every metric
    #[must_use]
    pub fn store(&self) -> &Arc<SeriesStore> {
        &self.store
    }

    /// Handles of the standard metrics
    #[must_use]
    pub fn metrics(&self) -> &StandardMetrics {
        &self.metrics
    }

    /// Render the exposition text
    pub fn export(&self) -> Result<Vec<u8>> {
        if let Some(process) = self.process {
            let uptime = self.clock.now().saturating_sub(self.created);
            self.store.gauge_set(process.uptime, &[], uptime.as_secs_f64())?;
        }
        render(&self.store)
    }

    /// Current reading as a start token
    #[must_use]
    pub fn start_token(&self) -> StartToken {
        StartToken::at(self.clock.now())
    }

    fn elapsed(&self, token: StartToken) -> Duration {
        token.elapsed(self.clock.now())
    }

    fn baseline(&self, f: impl FnOnce(&dyn Monitor)) {
        if let Some(baseline) = &self.baseline {
            f(baseline.as_ref());
        }
    }

    fn apply(&self, handler: &'static str, result: Result<()>) {
        if let Err(e) = result {
            error!(handler, error = %e, "Failed to update metric");
        }
    }

    // ── Messages ──

    /// Message received from a partition
    pub fn message_in(&self, tp: &TopicPartition, offset: i64) {
        self.baseline(|b| b.on_message_in(tp, offset));

        let m = &self.metrics;
        let partition = tp.partition.to_string();
        self.apply("message_in", self.store.counter_inc(m.messages_received, &[], 1.0));
        self.apply("message_in", self.store.gauge_inc(m.active_messages, &[], 1.0));
        self.apply(
            "message_in",
            self.store
                .counter_inc(m.messages_received_per_topic, &[tp.topic.as_str()], 1.0),
        );
        self.apply(
            "message_in",
            self.store.gauge_set(
                m.messages_received_per_topic_partition,
                &[tp.topic.as_str(), partition.as_str()],
                offset as f64,
            ),
        );
    }

    /// Message fully acknowledged
    pub fn message_out(&self, tp: &TopicPartition, offset: i64) {
        self.baseline(|b| b.on_message_out(tp, offset));
        self.apply(
            "message_out",
            self.store.gauge_dec(self.metrics.active_messages, &[], 1.0),
        );
    }

    // ── Stream events ──

    /// Stream started processing an event
    pub fn stream_event_in(&self, tp: &TopicPartition, offset: i64, stream: &str) -> StartToken {
        let token = self.start_token();
        self.baseline(|b| b.on_stream_event_in(tp, offset, stream));

        let m = &self.metrics;
        let label = stream_label(stream);
        self.apply("stream_event_in", self.store.counter_inc(m.total_events, &[], 1.0));
        self.apply(
            "stream_event_in",
            self.store.gauge_inc(m.total_active_events, &[], 1.0),
        );
        self.apply(
            "stream_event_in",
            self.store.counter_inc(m.total_events_per_stream, &[label.as_str()], 1.0),
        );
        token
    }

    /// Stream finished processing the event started with `token`
    pub fn stream_event_out(&self, tp: &TopicPartition, offset: i64, stream: &str, token: StartToken) {
        let runtime = self.elapsed(token);
        self.baseline(|b| b.on_stream_event_out(tp, offset, stream, runtime));

        let m = &self.metrics;
        self.apply(
            "stream_event_out",
            self.store.gauge_dec(m.total_active_events, &[], 1.0),
        );
        self.apply(
            "stream_event_out",
            self.store
                .histogram_observe(m.events_runtime_latency, &[], runtime.as_secs_f64()),
        );
    }

    // ── Tables ──

    /// Value read from a table
    pub fn table_get(&self, table: &str) {
        self.baseline(|b| b.on_table_get(table));
        self.table_operation(table, TableOperation::Get);
    }

    /// Value written to a table
    pub fn table_set(&self, table: &str) {
        self.baseline(|b| b.on_table_set(table));
        self.table_operation(table, TableOperation::Set);
    }

    /// Key deleted from a table
    pub fn table_del(&self, table: &str) {
        self.baseline(|b| b.on_table_del(table));
        self.table_operation(table, TableOperation::Del);
    }

    fn table_operation(&self, table: &str, operation: TableOperation) {
        let label = table_label(table);
        self.apply(
            "table_operation",
            self.store.counter_inc(
                self.metrics.table_operations,
                &[label.as_str(), operation.label()],
                1.0,
            ),
        );
    }

    // ── Producer ──

    /// Message added to the producer buffer
    pub fn send_initiated(&self, topic: &str) -> StartToken {
        let token = self.start_token();
        let label = send_topic_label(topic);
        self.apply(
            "send_initiated",
            self.store.counter_inc(self.metrics.topic_messages_sent, &[label.as_str()], 1.0),
        );
        self.baseline(|b| b.on_send_initiated(topic));
        token
    }

    /// Producer delivered the message sent with `token`
    pub fn send_completed(&self, token: StartToken) {
        let latency = self.elapsed(token);
        self.baseline(|b| b.on_send_completed(latency));

        let m = &self.metrics;
        self.apply("send_completed", self.store.counter_inc(m.total_sent_messages, &[], 1.0));
        self.apply(
            "send_completed",
            self.store
                .histogram_observe(m.producer_send_latency, &[], latency.as_secs_f64()),
        );
    }

    /// Producer failed to deliver the message sent with `token`
    pub fn send_error(&self, error: &str, token: StartToken) {
        let latency = self.elapsed(token);
        self.baseline(|b| b.on_send_error(error, latency));

        let m = &self.metrics;
        self.apply(
            "send_error",
            self.store.counter_inc(m.total_error_messages_sent, &[], 1.0),
        );
        self.apply(
            "send_error",
            self.store
                .histogram_observe(m.producer_error_send_latency, &[], latency.as_secs_f64()),
        );
    }

    // ── Assignment ──

    /// Partition assignment started
    pub fn assignment_start(&self) -> StartToken {
        let token = self.start_token();
        self.baseline(|b| b.on_assignment_start());
        token
    }

    /// Partition assignment started with `token` finished
    pub fn assignment_completed(&self, token: StartToken) {
        let latency = self.elapsed(token);
        self.baseline(|b| b.on_assignment_completed(latency));
        self.assignment(AssignmentOutcome::Completed, latency);
    }

    /// Partition assignment started with `token` failed
    pub fn assignment_error(&self, error: &str, token: StartToken) {
        let latency = self.elapsed(token);
        self.baseline(|b| b.on_assignment_error(error, latency));
        self.assignment(AssignmentOutcome::Error, latency);
    }

    fn assignment(&self, outcome: AssignmentOutcome, latency: Duration) {
        let m = &self.metrics;
        self.apply(
            "assignment",
            self.store
                .counter_inc(m.assignment_operations, &[outcome.label()], 1.0),
        );
        self.apply(
            "assignment",
            self.store
                .histogram_observe(m.assign_latency, &[], latency.as_secs_f64()),
        );
    }

    // ── Rebalance ──

    /// Cluster rebalance started
    pub fn rebalance_start(&self) -> StartToken {
        let token = self.start_token();
        self.baseline(|b| b.on_rebalance_start());
        self.apply(
            "rebalance_start",
            self.store.gauge_inc(self.metrics.total_rebalances, &[], 1.0),
        );
        token
    }

    /// Consumer reported the rebalance started with `token` done
    pub fn rebalance_return(&self, token: StartToken) {
        let latency = self.elapsed(token);
        self.baseline(|b| b.on_rebalance_return(latency));

        let m = &self.metrics;
        self.apply(
            "rebalance_return",
            self.store.gauge_dec(m.total_rebalances, &[], 1.0),
        );
        self.apply(
            "rebalance_return",
            self.store.gauge_inc(m.total_rebalances_recovering, &[], 1.0),
        );
        self.apply(
            "rebalance_return",
            self.store.histogram_observe(
                m.rebalance_done_consumer_latency,
                &[],
                latency.as_secs_f64(),
            ),
        );
    }

    /// Rebalance started with `token` fully completed
    pub fn rebalance_end(&self, token: StartToken) {
        let latency = self.elapsed(token);
        self.baseline(|b| b.on_rebalance_end(latency));

        let m = &self.metrics;
        self.apply(
            "rebalance_end",
            self.store.gauge_dec(m.total_rebalances_recovering, &[], 1.0),
        );
        self.apply(
            "rebalance_end",
            self.store
                .histogram_observe(m.rebalance_done_latency, &[], latency.as_secs_f64()),
        );
    }

    // ── Commits and offsets ──

    /// Consumer started committing offsets
    pub fn commit_initiated(&self) -> StartToken {
        let token = self.start_token();
        self.baseline(|b| b.on_commit_initiated());
        token
    }

    /// Commit started with `token` finished
    pub fn commit_completed(&self, token: StartToken) {
        let latency = self.elapsed(token);
        self.baseline(|b| b.on_commit_completed(latency));
        self.apply(
            "commit_completed",
            self.store.histogram_observe(
                self.metrics.consumer_commit_latency,
                &[],
                latency.as_secs_f64(),
            ),
        );
    }

    /// Offsets committed per topic partition
    pub fn tp_commit(&self, offsets: &TpOffsets) {
        self.baseline(|b| b.on_tp_commit(offsets));
        for (tp, offset) in offsets {
            let partition = tp.partition.to_string();
            self.apply(
                "tp_commit",
                self.store.gauge_set(
                    self.metrics.topic_partition_offset_commited,
                    &[tp.topic.as_str(), partition.as_str()],
                    *offset as f64,
                ),
            );
        }
    }

    /// New end offset seen for a topic partition
    pub fn track_tp_end_offset(&self, tp: &TopicPartition, offset: i64) {
        self.baseline(|b| b.on_track_tp_end_offset(tp, offset));
        let partition = tp.partition.to_string();
        self.apply(
            "track_tp_end_offset",
            self.store.gauge_set(
                self.metrics.topic_partition_end_offset,
                &[tp.topic.as_str(), partition.as_str()],
                offset as f64,
            ),
        );
    }

    // ── Web ──

    /// Web server started handling a request
    pub fn web_request_start(&self) -> StartToken {
        let token = self.start_token();
        self.baseline(|b| b.on_web_request_start());
        token
    }

    /// Request started with `token` finished; `status` is `None` without a response
    pub fn web_request_end(&self, status: Option<u16>, token: StartToken) {
        let latency = self.elapsed(token);
        self.baseline(|b| b.on_web_request_end(status, latency));

        let m = &self.metrics;
        let code = status.unwrap_or(FALLBACK_STATUS_CODE).to_string();
        self.apply(
            "web_request_end",
            self.store.counter_inc(m.http_status_codes, &[code.as_str()], 1.0),
        );
        self.apply(
            "web_request_end",
            self.store
                .histogram_observe(m.http_latency, &[], latency.as_secs_f64()),
        );
    }

    // ── Free-form counts ──

    /// Count one occurrence of `name`
    pub fn count(&self, name: &str) {
        self.count_by(name, 1);
    }

    /// Count `n` occurrences of `name`; negative `n` counts down
    pub fn count_by(&self, name: &str, n: i64) {
        self.baseline(|b| b.on_count(name, n));

        let handle = self.metrics.metrics_by_name;
        let result = if n >= 0 {
            self.store.gauge_inc(handle, &[name], n as f64)
        } else {
            self.store.gauge_dec(handle, &[name], n.unsigned_abs() as f64)
        };
        self.apply("count", result);
    }
}
