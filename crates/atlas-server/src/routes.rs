//! HTTP routes for the Atlas server.
//!
//! Defines the Axum router and application state. The entity endpoints sit
//! behind the introspection gate; the admin surface and health/metrics
//! endpoints do not.

use crate::auth::IntrospectionService;
use crate::config::Config;
use crate::handlers;
use crate::services::{QueryExecutor, RecordStore};
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// The token introspection pipeline.
    pub introspection: IntrospectionService,

    /// Entity query execution backend.
    pub query_executor: Arc<dyn QueryExecutor>,

    /// Admin record storage backend.
    pub record_store: Arc<dyn RecordStore>,

    /// Handle for rendering Prometheus metrics.
    pub metrics_handle: PrometheusHandle,
}

/// Install the Prometheus metrics recorder and register descriptions.
///
/// Call once at startup, before any metric is recorded.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    crate::observability::metrics::describe_metrics();
    Ok(handle)
}

/// Build the application routes.
///
/// Layer order (bottom-to-top execution):
/// 1. TimeoutLayer - bound request duration (innermost)
/// 2. TraceLayer - log request details
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/spatial/v1/entities",
            get(handlers::entities::entities_query),
        )
        .route(
            "/spatial/v1/entities/:domain/:user_hash/:resource_server/:resource_group/:resource_name",
            get(handlers::entities::entities_path),
        )
        .route(
            "/admin/spatial",
            get(handlers::admin::admin_get)
                .post(handlers::admin::admin_post)
                .put(handlers::admin::admin_put)
                .delete(handlers::admin::admin_delete),
        )
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics_render))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
