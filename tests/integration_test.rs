//! Integration tests for Sensorium
//!
//! These tests drive the crates together the way a host runtime would:
//! - sensorium-monitor: instrumentation hub, baseline monitor, clock
//! - sensorium-core: registry, series store, exposition rendering

use std::sync::Arc;
use std::time::Duration;

use sensorium_core::metrics::CARDINALITY_WARN_THRESHOLD;
use sensorium_core::MonitorConfig;
use sensorium_monitor::{
    BaselineMonitor, InstrumentationHub, ManualClock, TopicPartition, TpOffsets,
};

fn instrumented(config: MonitorConfig) -> (InstrumentationHub, Arc<BaselineMonitor>, Arc<ManualClock>) {
    let baseline = Arc::new(BaselineMonitor::new());
    let clock = Arc::new(ManualClock::default());
    let hub = InstrumentationHub::new(config)
        .unwrap()
        .with_baseline(baseline.clone())
        .with_clock(clock.clone());
    (hub, baseline, clock)
}

fn render(hub: &InstrumentationHub) -> String {
    String::from_utf8(hub.export().unwrap()).unwrap()
}

// ============================================================================
// Consumer lifecycle
// ============================================================================

#[test]
fn test_consumer_lifecycle_end_to_end() {
    let (hub, baseline, clock) = instrumented(MonitorConfig::with_prefix("faust", "orders"));
    let tp = TopicPartition::new("orders", 0);

    // Rebalance and assignment
    let rebalance = hub.rebalance_start();
    let assignment = hub.assignment_start();
    clock.advance(Duration::from_millis(200));
    hub.assignment_completed(assignment);
    hub.rebalance_return(rebalance);
    clock.advance(Duration::from_millis(800));
    hub.rebalance_end(rebalance);

    // Two messages through one stream, one table lookup each
    for offset in [10, 11] {
        hub.message_in(&tp, offset);
        let event = hub.stream_event_in(&tp, offset, "Stream: Topic: orders");
        hub.table_get("Order Totals");
        clock.advance(Duration::from_millis(5));
        hub.stream_event_out(&tp, offset, "Stream: Topic: orders", event);
        hub.message_out(&tp, offset);
    }

    // Forward a result and commit
    let send = hub.send_initiated("order-totals");
    clock.advance(Duration::from_millis(3));
    hub.send_completed(send);

    let commit = hub.commit_initiated();
    let mut offsets = TpOffsets::new();
    offsets.insert(tp.clone(), 11);
    hub.tp_commit(&offsets);
    hub.track_tp_end_offset(&tp, 12);
    hub.commit_completed(commit);

    let text = render(&hub);
    for line in [
        "faust_orders_messages_received 2\n",
        "faust_orders_active_messages 0\n",
        "faust_orders_messages_received_per_topic{topic=\"orders\"} 2\n",
        "faust_orders_messages_received_per_topic_partition{topic=\"orders\",partition=\"0\"} 11\n",
        "faust_orders_total_events_per_stream{stream=\"stream.topic_orders.events\"} 2\n",
        "faust_orders_events_runtime_latency_count 2\n",
        "faust_orders_table_operations{table=\"table.order_totals\",operation=\"keys_retrieved\"} 2\n",
        "faust_orders_topic_messages_sent{topic=\"topic.order-totals\"} 1\n",
        "faust_orders_total_sent_messages 1\n",
        "faust_orders_assignment_operations{operation=\"completed\"} 1\n",
        "faust_orders_total_rebalances 0\n",
        "faust_orders_total_rebalances_recovering 0\n",
        "faust_orders_rebalance_done_latency_sum 1\n",
        "faust_orders_topic_partition_offset_commited{topic=\"orders\",partition=\"0\"} 11\n",
        "faust_orders_topic_partition_end_offset{topic=\"orders\",partition=\"0\"} 12\n",
        "faust_orders_consumer_commit_latency_count 1\n",
    ] {
        assert!(text.contains(line), "missing {line:?} in:\n{text}");
    }

    let stats = baseline.stats();
    assert_eq!(stats.messages_received_total, 2);
    assert_eq!(stats.messages_active, 0);
    assert_eq!(stats.events_total, 2);
    assert_eq!(stats.tables["Order Totals"].keys_retrieved, 2);
    assert_eq!(stats.messages_sent, 1);
    assert_eq!(stats.assignments_completed, 1);
    assert_eq!(stats.rebalances, 1);
    assert_eq!(stats.tp_committed_offsets.get("orders:0"), Some(&11));
    assert_eq!(stats.tp_end_offsets.get("orders:0"), Some(&12));
}

#[test]
fn test_failures_are_recorded() {
    let (hub, baseline, clock) = instrumented(MonitorConfig::default());

    let send = hub.send_initiated("orders");
    clock.advance(Duration::from_secs(1));
    hub.send_error("broker unavailable", send);

    let assignment = hub.assignment_start();
    hub.assignment_error("coordinator moved", assignment);

    let request = hub.web_request_start();
    hub.web_request_end(None, request);

    let text = render(&hub);
    assert!(text.contains("total_error_messages_sent 1\n"));
    assert!(text.contains("producer_error_send_latency_sum 1\n"));
    assert!(text.contains("assignment_operations{operation=\"error\"} 1\n"));
    assert!(text.contains("http_status_codes{status_code=\"500\"} 1\n"));

    let stats = baseline.stats();
    assert_eq!(stats.send_errors, 1);
    assert_eq!(stats.assignments_failed, 1);
    assert!(stats.http_response_codes.is_empty());
}

// ============================================================================
// Exposition
// ============================================================================

#[test]
fn test_export_order_and_stability() {
    let (hub, _, _) = instrumented(MonitorConfig::default());
    hub.count("b_metric");
    hub.count("a_metric");
    hub.message_in(&TopicPartition::new("foo", 1), 5);

    let first = render(&hub);
    assert_eq!(first, render(&hub));

    // Definitions in registration order, series in first-observed order
    let received = first.find("# HELP messages_received ").unwrap();
    let by_name = first.find("# HELP metrics_by_name ").unwrap();
    assert!(received < by_name);

    let b = first.find("metrics_by_name{metric=\"b_metric\"} 1").unwrap();
    let a = first.find("metrics_by_name{metric=\"a_metric\"} 1").unwrap();
    assert!(b < a);
    assert!(first.ends_with('\n'));
}

#[test]
fn test_label_values_are_escaped() {
    let (hub, _, _) = instrumented(MonitorConfig::default());
    hub.count("quote\"back\\slash\nnewline");

    let text = render(&hub);
    assert!(text.contains(r#"metrics_by_name{metric="quote\"back\\slash\nnewline"} 1"#));
}

#[test]
fn test_hubs_with_different_prefixes_coexist() {
    let (orders, _, _) = instrumented(MonitorConfig::with_prefix("faust", "orders"));
    let (payments, _, _) = instrumented(MonitorConfig::with_prefix("faust", "payments"));

    orders.message_in(&TopicPartition::new("orders", 0), 1);

    assert!(render(&orders).contains("faust_orders_messages_received 1\n"));
    let other = render(&payments);
    assert!(other.contains("# TYPE faust_payments_messages_received counter\n"));
    assert!(!other.contains("faust_payments_messages_received 1"));
}

// ============================================================================
// Concurrency and cardinality
// ============================================================================

#[test]
fn test_concurrent_handlers_and_export() {
    let (hub, baseline, _) = instrumented(MonitorConfig::default());
    let hub = Arc::new(hub);

    std::thread::scope(|s| {
        for worker in 0..4 {
            let hub = Arc::clone(&hub);
            s.spawn(move || {
                let tp = TopicPartition::new(format!("topic-{worker}"), worker);
                for offset in 0..250 {
                    hub.message_in(&tp, offset);
                    hub.table_set("shared");
                    hub.message_out(&tp, offset);
                }
            });
        }
        let hub = Arc::clone(&hub);
        s.spawn(move || {
            for _ in 0..20 {
                assert!(hub.export().is_ok());
            }
        });
    });

    let text = render(&hub);
    assert!(text.contains("messages_received 1000\n"));
    assert!(text.contains("active_messages 0\n"));
    assert!(text.contains("table_operations{table=\"table.shared\",operation=\"keys_updated\"} 1000\n"));
    assert_eq!(baseline.stats().messages_received_total, 1000);
}

#[test]
fn test_high_cardinality_is_not_capped() {
    let (hub, _, _) = instrumented(MonitorConfig::default());
    let topics = CARDINALITY_WARN_THRESHOLD + 10;

    for i in 0..topics {
        hub.message_in(&TopicPartition::new(format!("t{i}"), 0), 0);
    }

    let handle = hub.metrics().messages_received_per_topic;
    assert_eq!(hub.store().series_count(handle), topics);
}
