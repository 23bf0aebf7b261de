//! Bounded policy caches with access-based expiry.
//!
//! Backed by moka's async cache: lock-free concurrent reads, bounded
//! capacity, and idle-time eviction. The expiry window is access-based
//! (`time_to_idle`), not write-based: an entry stays alive as long as it
//! keeps being read, and an entry untouched for the full window is treated
//! as absent on the next lookup.
//!
//! Population is idempotent; re-deriving the same policy twice is harmless,
//! so no cross-entry coordination is needed beyond the cache's own thread
//! safety.

use crate::observability::metrics::record_cache_lookup;
use crate::resolver::AccessPolicy;
use moka::future::Cache;
use std::time::Duration;

/// One bounded, access-expiring map from identifier to access policy.
///
/// Two independent instances exist per process: one keyed by group
/// identifier, one keyed by full resource identifier. Shared freely across
/// request pipelines; created at startup and never torn down.
pub struct PolicyCache {
    /// Cache name for metrics ("group" or "resource").
    name: &'static str,
    cache: Cache<String, AccessPolicy>,
}

impl PolicyCache {
    /// Create a cache bounded to `max_entries` with the given idle window.
    pub fn new(name: &'static str, max_entries: u64, idle_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(idle_ttl)
            .build();

        Self { name, cache }
    }

    /// Look up a policy. Returns `None` for absent or expired entries.
    pub async fn get(&self, key: &str) -> Option<AccessPolicy> {
        let result = self.cache.get(key).await;
        record_cache_lookup(self.name, result.is_some());
        result
    }

    /// Store a policy. The entry expires after the idle window or under
    /// capacity pressure.
    pub async fn insert(&self, key: String, policy: AccessPolicy) {
        self.cache.insert(key, policy).await;
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Run pending maintenance (triggers evictions). Useful for testing
    /// expiry behavior.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}
