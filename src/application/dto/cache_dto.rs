//! Cache administration DTOs.

use serde::Serialize;

/// Entries removed from one cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearedCache {
    /// Cache name.
    pub name: &'static str,
    /// Number of entries removed.
    pub removed: usize,
}

/// Result of clearing every cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    /// Per-cache counts.
    pub caches: Vec<ClearedCache>,
    /// Sum of all removed entries.
    pub total: usize,
}

impl ClearReport {
    /// Records a cleared cache.
    pub fn push(&mut self, name: &'static str, removed: usize) {
        self.total += removed;
        self.caches.push(ClearedCache { name, removed });
    }
}
