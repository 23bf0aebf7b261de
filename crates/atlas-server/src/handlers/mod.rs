//! HTTP request handlers.

pub mod admin;
pub mod entities;
pub mod health;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::json;

/// Marker the server sets in successful response envelopes.
pub const RESPONSE_SUCCESS_TYPE: &str = "urn:atlas:response:Success";

/// Fallback for routes the server does not implement.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "type": "urn:atlas:response:NotFound",
            "title": "Not Found",
        })),
    )
}
