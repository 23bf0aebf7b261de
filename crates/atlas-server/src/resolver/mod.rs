//! Resource access resolution.
//!
//! Determines a resource's access classification (open vs. secure) with as
//! few catalogue round trips as possible. Policy is declared upstream at
//! the group level (the 4-segment prefix of a resource identifier) and
//! inherited by every resource under the group, so two independent caches
//! are kept: one keyed by group identifier, one keyed by full resource
//! identifier. The resource-keyed entry is a deliberate denormalization
//! for read-path speed and is only written after the resource's existence
//! has been confirmed upstream.

pub mod cache;
pub mod catalogue;

use crate::auth::claims::Claims;
use crate::errors::AtlasError;
use cache::PolicyCache;
use catalogue::CatalogueLookup;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Access classification attached to a group and inherited by its
/// resources.
///
/// The upstream tag set is closed; anything that is not "OPEN"
/// (case-insensitive) is treated as restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// No identity or role check needed for allow-listed endpoints.
    Open,
    /// Full role/identity/strategy check required.
    Secure,
}

impl AccessPolicy {
    /// Parse an upstream policy tag.
    pub fn from_tag(tag: &str) -> AccessPolicy {
        if tag.eq_ignore_ascii_case("OPEN") {
            AccessPolicy::Open
        } else {
            AccessPolicy::Secure
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, AccessPolicy::Open)
    }
}

/// Number of leading segments that form the group identifier.
const GROUP_SEGMENT_COUNT: usize = 4;

/// Derive the group identifier: the first 4 `/`-separated segments of a
/// resource identifier. A 4-segment identifier is its own group.
///
/// # Errors
///
/// `MalformedResourceId` for identifiers with fewer than 4 segments.
pub fn group_identifier(resource_id: &str) -> Result<String, AtlasError> {
    let segments: Vec<&str> = resource_id.split('/').collect();
    if segments.len() < GROUP_SEGMENT_COUNT {
        return Err(AtlasError::MalformedResourceId(resource_id.to_string()));
    }

    Ok(segments
        .iter()
        .take(GROUP_SEGMENT_COUNT)
        .copied()
        .collect::<Vec<_>>()
        .join("/"))
}

/// Resolves resource identifiers to access policies through the two-tier
/// cache, falling back to the catalogue on miss.
///
/// The caches are owned here and injected at construction time; their
/// lifetime is the process lifetime.
pub struct AccessResolver {
    catalogue: Arc<dyn CatalogueLookup>,
    group_cache: PolicyCache,
    resource_cache: PolicyCache,
}

impl AccessResolver {
    pub fn new(catalogue: Arc<dyn CatalogueLookup>, max_entries: u64, idle_ttl: Duration) -> Self {
        Self {
            catalogue,
            group_cache: PolicyCache::new("group", max_entries, idle_ttl),
            resource_cache: PolicyCache::new("resource", max_entries, idle_ttl),
        }
    }

    /// Classify a resource for the given caller.
    ///
    /// Self-issued tokens (subject equals issuer) classify as open without
    /// consulting caches or the catalogue. Otherwise the resource cache is
    /// consulted first; on miss the group's policy is resolved (cache, then
    /// catalogue), the resource's existence is confirmed, and the group's
    /// policy is propagated into the resource cache.
    ///
    /// # Errors
    ///
    /// - `MalformedResourceId` for identifiers with fewer than 4 segments
    /// - `ResourceNotFound` when the catalogue does not know the group or
    ///   the resource
    /// - `UpstreamUnavailable` when a catalogue request could not be
    ///   completed
    #[instrument(skip(self, claims))]
    pub async fn classify(
        &self,
        resource_id: &str,
        claims: &Claims,
    ) -> Result<AccessPolicy, AtlasError> {
        if claims.is_self_issued() {
            tracing::debug!(target: "atlas.resolver", "Self-issued token, treating resource as open");
            return Ok(AccessPolicy::Open);
        }

        if let Some(policy) = self.resource_cache.get(resource_id).await {
            tracing::debug!(target: "atlas.resolver", "Resource cache hit");
            return Ok(policy);
        }

        tracing::debug!(target: "atlas.resolver", "Resource cache miss, resolving via catalogue");
        let group_id = group_identifier(resource_id)?;

        let policy = match self.group_cache.get(&group_id).await {
            Some(policy) => policy,
            None => {
                let policy = self.catalogue.group_access_policy(&group_id).await?;
                self.group_cache.insert(group_id.clone(), policy).await;
                policy
            }
        };

        // The resource entry may have appeared since the first lookup;
        // population is idempotent either way.
        if self.resource_cache.get(resource_id).await.is_none() {
            if !self.catalogue.resource_exists(resource_id).await? {
                tracing::debug!(target: "atlas.resolver", "Catalogue reports no such resource");
                return Err(AtlasError::ResourceNotFound(resource_id.to_string()));
            }
            self.resource_cache
                .insert(resource_id.to_string(), policy)
                .await;
        }

        Ok(policy)
    }

    /// The group-keyed cache (exposed for expiry-driven tests).
    pub fn group_cache(&self) -> &PolicyCache {
        &self.group_cache
    }

    /// The resource-keyed cache (exposed for expiry-driven tests).
    pub fn resource_cache(&self) -> &PolicyCache {
        &self.resource_cache
    }
}
