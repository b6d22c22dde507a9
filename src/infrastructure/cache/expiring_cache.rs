//! Generic in-memory cache with sliding or fixed expiry.

use std::fmt::Display;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lru::LruCache;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::trace;

use crate::domain::entities::CacheStats;

/// How long an entry stays live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// Entry expires after this long without being read.
    Sliding(Duration),
    /// Entry expires this long after it was stored.
    Fixed(Duration),
}

impl ExpiryPolicy {
    /// Lifetime of the policy.
    #[must_use]
    pub const fn ttl(self) -> Duration {
        match self {
            Self::Sliding(ttl) | Self::Fixed(ttl) => ttl,
        }
    }
}

impl Display for ExpiryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sliding(ttl) => write!(f, "sliding {}s", ttl.as_secs()),
            Self::Fixed(ttl) => write!(f, "fixed {}s", ttl.as_secs()),
        }
    }
}

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    last_access: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, now: Instant) -> Self {
        Self {
            value,
            inserted_at: now,
            last_access: now,
        }
    }

    fn is_expired(&self, policy: ExpiryPolicy, now: Instant) -> bool {
        let since = match policy {
            ExpiryPolicy::Sliding(_) => self.last_access,
            ExpiryPolicy::Fixed(_) => self.inserted_at,
        };
        now.saturating_duration_since(since) >= policy.ttl()
    }
}

/// Keyed cache holding at most one live entry per key.
///
/// Expired entries are dropped lazily on lookup and eagerly by
/// [`ExpiringCache::purge_expired`]. With a capacity the least recently
/// used entry is evicted first.
pub struct ExpiringCache<K, V> {
    entries: RwLock<LruCache<K, CacheEntry<V>>>,
    policy: ExpiryPolicy,
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    evictions: AtomicU64,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Hash + Eq + Clone + Display,
    V: Clone,
{
    /// Creates an unbounded cache.
    #[must_use]
    pub fn new(policy: ExpiryPolicy) -> Self {
        Self::with_entries(LruCache::unbounded(), policy)
    }

    /// Creates a cache bounded to `capacity` entries (minimum one).
    #[must_use]
    pub fn bounded(capacity: usize, policy: ExpiryPolicy) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self::with_entries(LruCache::new(cap), policy)
    }

    fn with_entries(entries: LruCache<K, CacheEntry<V>>, policy: ExpiryPolicy) -> Self {
        Self {
            entries: RwLock::new(entries),
            policy,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stores: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Expiry policy of the cache.
    #[must_use]
    pub const fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    /// Returns a live value, refreshing its sliding window.
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let expired = match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(self.policy, now) => {
                entry.last_access = now;
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "Cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Cache entry expired");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(key = %key, "Cache miss");
        None
    }

    /// Returns a live value without touching its window or the counters.
    pub async fn peek(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .peek(key)
            .filter(|entry| !entry.is_expired(self.policy, now))
            .map(|entry| entry.value.clone())
    }

    /// Returns whether a live entry exists, without touching it.
    pub async fn contains(&self, key: &K) -> bool {
        self.peek(key).await.is_some()
    }

    /// Stores a value, replacing any previous entry for the key.
    pub async fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        if entries.push(key, CacheEntry::new(value, now)).is_some() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    /// Removes the entry for `key`, returning whether one was present.
    pub async fn remove(&self, key: &K) -> bool {
        let removed = self.entries.write().await.pop(key).is_some();
        if removed {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// Keys of live entries, most recently used first.
    pub async fn keys(&self) -> Vec<K> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(self.policy, now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Removes every entry and returns how many were held.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
        count
    }

    /// Removes expired entries and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let expired: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.policy, now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        self.evictions
            .fetch_add(expired.len() as u64, Ordering::Relaxed);
        expired.len()
    }

    /// Number of held entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true when nothing is held.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Current counters.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: self.len().await,
        }
    }
}
