//! Health and metrics endpoints.

use crate::routes::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// GET /metrics in Prometheus exposition format.
pub async fn metrics_render(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
