//! Metrics definitions for the Atlas server.
//!
//! All metrics follow Prometheus naming conventions:
//! - `atlas_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `outcome`: "ok" plus the fixed set of failure codes
//! - `cache`: 2 values ("group", "resource")
//! - `lookup`: 2 values ("group_policy", "existence")
//! - `status`: 3 values (success, error, transport)

use metrics::{counter, histogram};
use std::time::Duration;

/// Record the outcome of one introspection pipeline run.
///
/// Metric: `atlas_introspections_total`
/// Labels: `outcome` ("ok" or the failure code)
pub fn record_introspection(outcome: &'static str) {
    counter!("atlas_introspections_total", "outcome" => outcome).increment(1);
}

/// Record a policy cache lookup.
///
/// Metrics: `atlas_policy_cache_hits_total`, `atlas_policy_cache_misses_total`
/// Labels: `cache` ("group" or "resource")
pub fn record_cache_lookup(cache: &'static str, hit: bool) {
    if hit {
        counter!("atlas_policy_cache_hits_total", "cache" => cache).increment(1);
    } else {
        counter!("atlas_policy_cache_misses_total", "cache" => cache).increment(1);
    }
}

/// Record a catalogue round trip.
///
/// Metrics: `atlas_catalogue_requests_total`,
/// `atlas_catalogue_request_duration_seconds`
/// Labels: `lookup` ("group_policy" or "existence"), `status`
pub fn record_catalogue_request(lookup: &'static str, status: &'static str, duration: Duration) {
    histogram!("atlas_catalogue_request_duration_seconds",
        "lookup" => lookup,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("atlas_catalogue_requests_total",
        "lookup" => lookup,
        "status" => status
    )
    .increment(1);
}

/// Register metric descriptions with the installed recorder.
///
/// Optional; called once at startup for better documentation in
/// Prometheus/Grafana.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "atlas_introspections_total",
        "Total number of token introspection pipeline runs"
    );
    metrics::describe_counter!(
        "atlas_policy_cache_hits_total",
        "Total number of policy cache hits"
    );
    metrics::describe_counter!(
        "atlas_policy_cache_misses_total",
        "Total number of policy cache misses"
    );
    metrics::describe_counter!(
        "atlas_catalogue_requests_total",
        "Total number of catalogue lookups"
    );
    metrics::describe_histogram!(
        "atlas_catalogue_request_duration_seconds",
        "Catalogue lookup round-trip time"
    );
}
