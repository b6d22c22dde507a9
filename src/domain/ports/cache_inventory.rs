//! Enumerable cache port used by administrative operations.

use async_trait::async_trait;

use crate::domain::entities::CacheSnapshot;

/// A cache that can list, purge and clear its own entries.
///
/// Implementations must tolerate being cleared while lookups are in flight.
#[async_trait]
pub trait CacheInventory: Send + Sync {
    /// Stable cache name used in reports.
    fn name(&self) -> &'static str;

    /// Keys of all live entries.
    async fn keys(&self) -> Vec<String>;

    /// Removes every entry and returns how many were removed.
    async fn clear(&self) -> usize;

    /// Removes expired entries and returns how many were removed.
    async fn purge_expired(&self) -> usize;

    /// Diagnostic view of the cache.
    async fn snapshot(&self) -> CacheSnapshot;
}
