//! Catalogue service client.
//!
//! The catalogue is the service of record for resource and group metadata,
//! queried only on cache miss. Lookups are HTTP GETs against a fixed search
//! path with three query parameters: `property` (fields to match), `value`
//! (values to match) and `filter` (fields to project back).
//!
//! A response is only trusted when it carries the catalogue's success
//! marker type; anything else the catalogue answered maps to
//! `ResourceNotFound`. `UpstreamUnavailable` is reserved for requests that
//! could not be completed at the transport layer.

use crate::errors::AtlasError;
use crate::observability::metrics::record_catalogue_request;
use crate::resolver::AccessPolicy;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Fixed search path on the catalogue service.
pub const CATALOGUE_SEARCH_PATH: &str = "/catalogue/v1/search";

/// Success marker the catalogue sets in its `type` field.
pub const CATALOGUE_SUCCESS_TYPE: &str = "urn:atlas:cat:Success";

/// Request timeout for catalogue lookups in seconds.
const CATALOGUE_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Catalogue lookups the resolver depends on.
///
/// A trait seam so the resolver can be exercised against an in-memory
/// substitute catalogue in tests.
#[async_trait]
pub trait CatalogueLookup: Send + Sync {
    /// The access policy declared for a group identifier.
    async fn group_access_policy(&self, group_id: &str) -> Result<AccessPolicy, AtlasError>;

    /// Whether the exact resource identifier exists upstream.
    async fn resource_exists(&self, resource_id: &str) -> Result<bool, AtlasError>;
}

/// Search response envelope.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "type")]
    response_type: String,

    #[serde(rename = "totalHits", default)]
    total_hits: i64,

    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "accessPolicy")]
    access_policy: Option<String>,
}

/// HTTP client for the catalogue service.
pub struct CatalogueClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogueClient {
    /// Create a client against a base URL (e.g. "https://cat.example:443").
    ///
    /// # Errors
    ///
    /// Returns `AtlasError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: String) -> Result<Self, AtlasError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(CATALOGUE_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                tracing::error!(target: "atlas.resolver.catalogue", error = %e, "Failed to build HTTP client");
                AtlasError::Internal
            })?;

        Ok(Self { client, base_url })
    }

    /// Create a client for a configured host and port over HTTPS.
    pub fn for_host(host: &str, port: u16) -> Result<Self, AtlasError> {
        Self::new(format!("https://{}:{}", host, port))
    }

    /// Issue one search: match `id` against `value`, project back `filter`.
    async fn search(
        &self,
        lookup: &'static str,
        value: &str,
        filter: &str,
    ) -> Result<SearchResponse, AtlasError> {
        let url = format!("{}{}", self.base_url, CATALOGUE_SEARCH_PATH);
        let started = Instant::now();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("property", "[id]"),
                ("value", &format!("[[{}]]", value)),
                ("filter", filter),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(target: "atlas.resolver.catalogue", error = %e, "Catalogue request failed");
                record_catalogue_request(lookup, "transport", started.elapsed());
                AtlasError::UpstreamUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(target: "atlas.resolver.catalogue", status = %status, "Catalogue returned error status");
            record_catalogue_request(lookup, "error", started.elapsed());
            return Err(AtlasError::ResourceNotFound(value.to_string()));
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            tracing::warn!(target: "atlas.resolver.catalogue", error = %e, "Failed to parse catalogue response");
            record_catalogue_request(lookup, "error", started.elapsed());
            AtlasError::ResourceNotFound(value.to_string())
        })?;

        if body.response_type != CATALOGUE_SUCCESS_TYPE {
            tracing::debug!(
                target: "atlas.resolver.catalogue",
                response_type = %body.response_type,
                "Catalogue response type is not the success marker"
            );
            record_catalogue_request(lookup, "error", started.elapsed());
            return Err(AtlasError::ResourceNotFound(value.to_string()));
        }

        record_catalogue_request(lookup, "success", started.elapsed());
        Ok(body)
    }
}

#[async_trait]
impl CatalogueLookup for CatalogueClient {
    #[instrument(skip(self))]
    async fn group_access_policy(&self, group_id: &str) -> Result<AccessPolicy, AtlasError> {
        let body = self.search("group_policy", group_id, "[accessPolicy]").await?;

        let tag = body
            .results
            .first()
            .and_then(|r| r.access_policy.as_deref())
            .ok_or_else(|| {
                tracing::debug!(target: "atlas.resolver.catalogue", "Empty results for group policy lookup");
                AtlasError::ResourceNotFound(group_id.to_string())
            })?;

        Ok(AccessPolicy::from_tag(tag))
    }

    #[instrument(skip(self))]
    async fn resource_exists(&self, resource_id: &str) -> Result<bool, AtlasError> {
        let body = self.search("existence", resource_id, "[id]").await?;
        Ok(body.total_hits > 0)
    }
}
