//! Admin CRUD handlers for resource metadata.
//!
//! Thin shims over the record store seam. GET on the admin base path is
//! not part of the surface and answers 405.

use crate::errors::AtlasError;
use crate::handlers::RESPONSE_SUCCESS_TYPE;
use crate::routes::AppState;
use crate::services::AdminRecord;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct AdminDeleteParams {
    pub id: String,
}

fn success_body() -> Json<serde_json::Value> {
    Json(json!({
        "type": RESPONSE_SUCCESS_TYPE,
        "title": "Success",
    }))
}

/// GET /admin/spatial
pub async fn admin_get() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "type": "urn:atlas:response:MethodNotAllowed",
            "title": "Method Not Allowed",
        })),
    )
}

/// POST /admin/spatial
pub async fn admin_post(
    State(state): State<Arc<AppState>>,
    Json(record): Json<AdminRecord>,
) -> Result<impl IntoResponse, AtlasError> {
    state.record_store.insert(record).await?;
    Ok(success_body())
}

/// PUT /admin/spatial
pub async fn admin_put(
    State(state): State<Arc<AppState>>,
    Json(record): Json<AdminRecord>,
) -> Result<impl IntoResponse, AtlasError> {
    state.record_store.update(record).await?;
    Ok(success_body())
}

/// DELETE /admin/spatial?id=<resource id>
pub async fn admin_delete(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AdminDeleteParams>,
) -> Result<impl IntoResponse, AtlasError> {
    state.record_store.delete(&params.id).await?;
    Ok(success_body())
}
