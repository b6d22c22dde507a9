//! In-memory cache of encoded derivatives.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::expiring_cache::{ExpiringCache, ExpiryPolicy};
use crate::domain::entities::{CacheSnapshot, DerivativeResult, Fingerprint};
use crate::domain::ports::CacheInventory;

/// Default lifetime of a cached derivative.
pub const DEFAULT_DERIVATIVE_TTL: Duration = Duration::from_secs(120 * 60);

/// Fingerprint-keyed derivative cache with a fixed TTL.
///
/// When disabled, lookups always miss and stores are dropped, so callers
/// never branch on the configuration themselves.
pub struct DerivativeCache {
    cache: ExpiringCache<Fingerprint, DerivativeResult>,
    enabled: bool,
}

impl DerivativeCache {
    /// Creates an enabled cache; `max_entries` bounds it with LRU eviction.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: Option<usize>) -> Self {
        let policy = ExpiryPolicy::Fixed(ttl);
        let cache = match max_entries {
            Some(capacity) => ExpiringCache::bounded(capacity, policy),
            None => ExpiringCache::new(policy),
        };
        Self {
            cache,
            enabled: true,
        }
    }

    /// Creates a pass-through cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            cache: ExpiringCache::new(ExpiryPolicy::Fixed(DEFAULT_DERIVATIVE_TTL)),
            enabled: false,
        }
    }

    /// Whether the cache accepts entries.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the cached derivative for `fingerprint`.
    pub async fn lookup(&self, fingerprint: &Fingerprint) -> Option<DerivativeResult> {
        if !self.enabled {
            return None;
        }
        self.cache.get(fingerprint).await
    }

    /// Stores a derivative, overwriting any previous one.
    pub async fn store(&self, fingerprint: Fingerprint, result: DerivativeResult) {
        if !self.enabled {
            return;
        }
        debug!(fingerprint = %fingerprint, bytes = result.bytes.len(), "Caching derivative");
        self.cache.insert(fingerprint, result).await;
    }
}

#[async_trait]
impl CacheInventory for DerivativeCache {
    fn name(&self) -> &'static str {
        "derivatives"
    }

    async fn keys(&self) -> Vec<String> {
        self.cache
            .keys()
            .await
            .into_iter()
            .map(|fingerprint| fingerprint.as_str().to_string())
            .collect()
    }

    async fn clear(&self) -> usize {
        let count = self.cache.clear().await;
        info!(count, "Cleared derivative cache");
        count
    }

    async fn purge_expired(&self) -> usize {
        self.cache.purge_expired().await
    }

    async fn snapshot(&self) -> CacheSnapshot {
        let stats = self.cache.stats().await;
        let mut extra = serde_json::Map::new();
        extra.insert(
            "hit_rate".to_string(),
            serde_json::json!(format!("{:.1}", stats.hit_rate())),
        );

        CacheSnapshot {
            name: self.name(),
            policy: self.cache.policy().to_string(),
            enabled: self.is_enabled(),
            keys: self.keys().await,
            stats,
            extra,
        }
    }
}
