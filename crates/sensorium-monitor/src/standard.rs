//! The fixed metric set maintained by the instrumentation hub.

use sensorium_core::metrics::{MetricDefinition, MetricHandle, MetricKind, MetricsRegistry};
use sensorium_core::{MonitorConfig, Result};

/// One row of the standard metric table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardDefinition {
    /// Short metric name
    pub name: &'static str,
    /// Metric kind
    pub kind: MetricKind,
    /// Help text
    pub help: &'static str,
    /// Label schema
    pub labels: &'static [&'static str],
}

impl StandardDefinition {
    /// Build the definition under the configured prefixes
    #[must_use]
    pub fn build(&self, config: &MonitorConfig) -> MetricDefinition {
        let definition = match self.kind {
            MetricKind::Counter => MetricDefinition::counter(self.name, self.help),
            MetricKind::Gauge => MetricDefinition::gauge(self.name, self.help),
            MetricKind::Histogram => MetricDefinition::histogram(self.name, self.help),
        };
        definition
            .with_labels(self.labels)
            .with_prefix(config.namespace.as_str(), config.subsystem.as_str())
    }
}

macro_rules! standard_metrics {
    ($( $(#[$doc:meta])* $field:ident: $kind:ident, $help:literal, [$($label:literal),*]; )*) => {
        /// Handles to every standard metric
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct StandardMetrics {
            $( $(#[$doc])* pub $field: MetricHandle, )*
        }

        /// The standard metric table, in registration order
        pub const STANDARD_DEFINITIONS: &[StandardDefinition] = &[
            $(
                StandardDefinition {
                    name: stringify!($field),
                    kind: MetricKind::$kind,
                    help: $help,
                    labels: &[$($label),*],
                },
            )*
        ];

        impl StandardMetrics {
            /// Register the whole table, in order, under the configured prefixes
            pub fn register(registry: &mut MetricsRegistry, config: &MonitorConfig) -> Result<Self> {
                Ok(Self {
                    $(
                        $field: registry.register(
                            StandardDefinition {
                                name: stringify!($field),
                                kind: MetricKind::$kind,
                                help: $help,
                                labels: &[$($label),*],
                            }
                            .build(config),
                        )?,
                    )*
                })
            }
        }
    };
}

standard_metrics! {
    /// Messages received
    messages_received: Counter, "Total messages received", [];
    /// Messages received but not yet acknowledged
    active_messages: Gauge, "Total active messages", [];
    /// Messages received per topic
    messages_received_per_topic: Counter, "Messages received per topic", ["topic"];
    /// Last offset received per topic/partition
    messages_received_per_topic_partition: Gauge, "Messages received per topic/partition", ["topic", "partition"];
    /// Stream event processing time
    events_runtime_latency: Histogram, "Events runtime in seconds", [];
    /// Stream events received
    total_events: Counter, "Total events received", [];
    /// Stream events in flight
    total_active_events: Gauge, "Total active events", [];
    /// Stream events per stream
    total_events_per_stream: Counter, "Events received per Stream", ["stream"];
    /// Table key operations
    table_operations: Counter, "Total table operations", ["table", "operation"];
    /// Messages sent per topic
    topic_messages_sent: Counter, "Total messages sent per topic", ["topic"];
    /// Messages delivered
    total_sent_messages: Counter, "Total messages sent", [];
    /// Delivery latency
    producer_send_latency: Histogram, "Producer send latency in seconds", [];
    /// Failed deliveries
    total_error_messages_sent: Counter, "Total error messages sent", [];
    /// Latency of failed deliveries
    producer_error_send_latency: Histogram, "Producer error send latency in seconds", [];
    /// Partition assignments by outcome
    assignment_operations: Counter, "Total assigment operations (completed/error)", ["operation"];
    /// Partition assignment latency
    assign_latency: Histogram, "Assignment latency in seconds", [];
    /// Rebalances in progress
    total_rebalances: Gauge, "Total rebalances", [];
    /// Rebalances recovering
    total_rebalances_recovering: Gauge, "Total rebalances recovering", [];
    /// Time until the consumer reported the rebalance done
    rebalance_done_consumer_latency: Histogram, "Consumer replying that rebalance is done to broker in seconds", [];
    /// Time until the rebalance finished
    rebalance_done_latency: Histogram, "Rebalance finished latency in seconds", [];
    /// Free-form counts by name
    metrics_by_name: Gauge, "Total metrics by name", ["metric"];
    /// HTTP responses by status code
    http_status_codes: Counter, "Total http_status code", ["status_code"];
    /// HTTP response latency
    http_latency: Histogram, "Http response latency in seconds", [];
    /// End offset per topic/partition
    topic_partition_end_offset: Gauge, "Offset ends per topic/partition", ["topic", "partition"];
    /// Committed offset per topic/partition
    topic_partition_offset_commited: Gauge, "Offset commited per topic/partition", ["topic", "partition"];
    /// Offset commit latency
    consumer_commit_latency: Histogram, "Consumer commit latency in seconds", [];
}

/// Process collectors, registered without prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessMetrics {
    /// Unix time the hub was built
    pub start_time: MetricHandle,
    /// Seconds since the hub was built, refreshed on export
    pub uptime: MetricHandle,
}

impl ProcessMetrics {
    /// Register the process collectors
    pub fn register(registry: &mut MetricsRegistry) -> Result<Self> {
        Ok(Self {
            start_time: registry.register(MetricDefinition::gauge(
                "process_start_time_seconds",
                "Start time of the process since unix epoch in seconds",
            ))?,
            uptime: registry.register(MetricDefinition::gauge(
                "process_uptime_seconds",
                "Seconds since the monitor was created",
            ))?,
        })
    }
}
