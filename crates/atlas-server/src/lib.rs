//! Atlas Spatial Data Server Library
//!
//! Core functionality for the Atlas geospatial data API: a bearer-token
//! introspection and access-control resolution engine, with a thin HTTP
//! boundary around it.
//!
//! # Architecture
//!
//! Per request, three components compose into one asynchronous fail-fast
//! pipeline:
//!
//! ```text
//! TokenValidator -> AccessResolver -> AuthorizationEngine
//! ```
//!
//! The validator verifies the bearer token and re-checks audience, issuer
//! and expiry. The resolver classifies the requested resource as open or
//! secure through two TTL-bounded caches backed by the catalogue service.
//! The engine decides allow/deny via role-keyed strategies and produces
//! the minimal authorized context.
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Failure taxonomy with stable codes and HTTP mapping
//! - `auth` - Token verification, validation and the introspection pipeline
//! - `authz` - Authorization engine and per-role strategies
//! - `resolver` - Two-tier cached access classification + catalogue client
//! - `middleware` - Bearer extraction and the authorized-context extractor
//! - `handlers` - HTTP request handlers
//! - `routes` - Axum router setup
//! - `services` - External collaborator seams (query execution, records)
//! - `observability` - Metric definitions

pub mod auth;
pub mod authz;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod resolver;
pub mod routes;
pub mod services;
