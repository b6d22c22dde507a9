//! Cache statistics and diagnostic snapshots.

use serde::Serialize;

/// Counters kept by every cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing or an expired entry.
    pub misses: u64,
    /// Successful inserts.
    pub stores: u64,
    /// Entries removed by expiry, capacity or replacement.
    pub evictions: u64,
    /// Entries currently held.
    pub size: usize,
}

impl CacheStats {
    /// Hit rate as a percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} entries, {:.1}% hit rate ({} hits, {} misses, {} evictions)",
            self.size,
            self.hit_rate(),
            self.hits,
            self.misses,
            self.evictions
        )
    }
}

/// Diagnostic view of one cache.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    /// Cache name.
    pub name: &'static str,
    /// Human-readable expiry policy.
    pub policy: String,
    /// Whether the cache accepts entries.
    pub enabled: bool,
    /// Live keys.
    pub keys: Vec<String>,
    /// Counters.
    pub stats: CacheStats,
    /// Cache-specific details.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_without_lookups_is_zero() {
        assert!(CacheStats::default().hit_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert!((stats.hit_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_flattens_extra() {
        let mut extra = serde_json::Map::new();
        extra.insert("entries".to_string(), serde_json::json!(4));
        let snapshot = CacheSnapshot {
            name: "rewrites",
            policy: "sliding 7200s".to_string(),
            enabled: true,
            keys: vec!["rewrite-map".to_string()],
            stats: CacheStats::default(),
            extra,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["name"], "rewrites");
        assert_eq!(json["entries"], 4);
        assert_eq!(json["keys"][0], "rewrite-map");
    }
}
