//! Baseline statistics endpoint

use super::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use sensorium_monitor::BaselineStats;

/// Current baseline statistics, 404 when the baseline is disabled
async fn stats(State(state): State<AppState>) -> Result<Json<BaselineStats>, StatusCode> {
    state
        .baseline
        .as_ref()
        .map(|baseline| Json(baseline.stats()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Create stats routes
pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}
