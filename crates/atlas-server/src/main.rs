//! Atlas Spatial Data Server
//!
//! Entry point: loads configuration, wires the introspection engine and its
//! collaborators, and serves the HTTP API until shutdown.

use atlas_server::auth::{Ed25519Verifier, IntrospectionService, TokenValidator};
use atlas_server::authz::AuthorizationEngine;
use atlas_server::config::Config;
use atlas_server::resolver::catalogue::CatalogueClient;
use atlas_server::resolver::AccessResolver;
use atlas_server::routes::{self, AppState};
use atlas_server::services::{MemoryQueryExecutor, MemoryRecordStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atlas_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Atlas server");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        audience = %config.audience,
        issuer = %config.issuer,
        catalogue_host = %config.catalogue_host,
        catalogue_port = config.catalogue_port,
        cache_max_entries = config.cache_max_entries,
        cache_ttl_minutes = config.cache_ttl_minutes,
        "Configuration loaded successfully"
    );

    // Install metrics recorder
    let metrics_handle = routes::init_metrics_recorder().map_err(|e| {
        error!("Failed to install metrics recorder: {}", e);
        e
    })?;

    // Wire the introspection pipeline
    let verifier = Ed25519Verifier::from_base64_key(&config.token_public_key)?;
    let validator = TokenValidator::new(
        Arc::new(verifier),
        config.audience.clone(),
        config.issuer.clone(),
    );

    let catalogue = CatalogueClient::for_host(&config.catalogue_host, config.catalogue_port)?;
    let resolver = AccessResolver::new(
        Arc::new(catalogue),
        config.cache_max_entries,
        Duration::from_secs(config.cache_ttl_minutes * 60),
    );

    let engine = AuthorizationEngine::new(config.open_endpoints.clone());
    let introspection = IntrospectionService::new(validator, resolver, engine);

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    let state = Arc::new(AppState {
        config,
        introspection,
        query_executor: Arc::new(MemoryQueryExecutor::new()),
        record_store: Arc::new(MemoryRecordStore::new()),
        metrics_handle,
    });

    let app = routes::build_routes(state);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Atlas server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Atlas server shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
