//! Metrics exposition endpoint

use super::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use sensorium_core::CONTENT_TYPE;
use tracing::error;

/// Render every metric in the text exposition format
async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.hub.export() {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Create the exposition route at `path`
pub fn metrics_routes(path: &str) -> Router<AppState> {
    Router::new().route(path, get(metrics_endpoint))
}
