//! Web API module for Sensorium
//!
//! Provides endpoints for:
//! - Metrics exposition at the configured path
//! - Health checks
//! - Baseline statistics

pub mod health;
pub mod metrics;
pub mod stats;

use crate::middleware::RequestMetricsLayer;
use axum::Router;
use sensorium_monitor::{BaselineMonitor, InstrumentationHub};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use health::health_routes;
pub use metrics::metrics_routes;
pub use stats::stats_routes;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<InstrumentationHub>,
    pub baseline: Option<Arc<BaselineMonitor>>,
}

/// Create the router with all endpoints
pub fn router(state: AppState) -> Router {
    let path = state.hub.config().path.clone();
    Router::new()
        .merge(health_routes())
        .merge(metrics_routes(&path))
        .merge(stats_routes())
        .layer(RequestMetricsLayer::new(state.hub.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use sensorium_core::{MonitorConfig, CONTENT_TYPE};
    use sensorium_monitor::TopicPartition;
    use tower::ServiceExt;

    fn state(config: MonitorConfig) -> AppState {
        let baseline = Arc::new(BaselineMonitor::new());
        let hub = InstrumentationHub::new(config)
            .unwrap()
            .with_baseline(baseline.clone());
        AppState {
            hub: Arc::new(hub),
            baseline: Some(baseline),
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let state = state(MonitorConfig::with_prefix("faust", ""));
        state.hub.message_in(&TopicPartition::new("foo", 3), 400);

        let (status, content_type, body) = get(router(state), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(CONTENT_TYPE));
        assert!(body.contains("# TYPE faust_messages_received counter\n"));
        assert!(body.contains("faust_messages_received 1\n"));
    }

    #[tokio::test]
    async fn test_custom_metrics_path() {
        let config = MonitorConfig {
            path: "/prometheus".to_string(),
            ..MonitorConfig::default()
        };
        let app = router(state(config));

        let (status, _, _) = get(app.clone(), "/prometheus").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = get(app, "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_requests_are_counted() {
        let state = state(MonitorConfig::default());
        let app = router(state.clone());

        get(app.clone(), "/health").await;
        get(app.clone(), "/health").await;
        let (_, _, body) = get(app, "/metrics").await;

        assert!(body.contains("http_status_codes{status_code=\"200\"} 2\n"));
        assert!(body.contains("http_latency_count 2\n"));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, _, body) = get(router(state(MonitorConfig::default())), "/health").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let state = state(MonitorConfig::default());
        state.hub.table_get("Table1");
        state.hub.count_by("retries", 2);

        let (status, _, body) = get(router(state), "/stats").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["tables"]["Table1"]["keys_retrieved"], 1);
        assert_eq!(json["metric_counts"]["retries"], 2);
    }

    #[tokio::test]
    async fn test_stats_disabled() {
        let mut state = state(MonitorConfig::default());
        state.baseline = None;

        let (status, _, _) = get(router(state), "/stats").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
