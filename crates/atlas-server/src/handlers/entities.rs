//! Entity query handlers.
//!
//! Both forms sit behind the introspection gate; the handlers themselves
//! only forward the resource identifier to the query execution seam and
//! wrap the rows in the response envelope.

use crate::errors::AtlasError;
use crate::handlers::RESPONSE_SUCCESS_TYPE;
use crate::middleware::auth::{AuthContext, EntityQueryParams};
use crate::routes::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Successful query response envelope.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    #[serde(rename = "type")]
    pub response_type: String,
    pub title: String,
    pub results: Vec<Value>,
}

impl QueryResponse {
    fn success(results: Vec<Value>) -> Self {
        Self {
            response_type: RESPONSE_SUCCESS_TYPE.to_string(),
            title: "Success".to_string(),
            results,
        }
    }
}

/// GET /spatial/v1/entities?id=<resource id>
pub async fn entities_query(
    State(state): State<Arc<AppState>>,
    _auth: AuthContext,
    Query(params): Query<EntityQueryParams>,
) -> Result<Json<QueryResponse>, AtlasError> {
    let rows = state.query_executor.entities(&params.id).await?;
    Ok(Json(QueryResponse::success(rows)))
}

/// GET /spatial/v1/entities/{domain}/{userHash}/{server}/{group}/{name}
pub async fn entities_path(
    State(state): State<Arc<AppState>>,
    _auth: AuthContext,
    Path(segments): Path<(String, String, String, String, String)>,
) -> Result<Json<QueryResponse>, AtlasError> {
    let resource_id = format!(
        "{}/{}/{}/{}/{}",
        segments.0, segments.1, segments.2, segments.3, segments.4
    );
    let rows = state.query_executor.entities(&resource_id).await?;
    Ok(Json(QueryResponse::success(rows)))
}
