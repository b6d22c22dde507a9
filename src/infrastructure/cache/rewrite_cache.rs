//! Cached rewrite table with sliding expiry.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::expiring_cache::{ExpiringCache, ExpiryPolicy};
use crate::domain::entities::{CacheSnapshot, RewriteTable};
use crate::domain::errors::ImageError;
use crate::domain::ports::CacheInventory;
use crate::infrastructure::rewrites::parse_rewrites;

/// Key under which the table is cached.
pub const REWRITE_MAP_KEY: &str = "rewrite-map";

/// Default sliding window of the cached table.
pub const DEFAULT_SLIDING_EXPIRATION: Duration = Duration::from_secs(2 * 60 * 60);

/// Holds the single rewrite table built from the configuration file.
pub struct RewriteTableCache {
    cache: ExpiringCache<&'static str, Arc<RewriteTable>>,
    source: PathBuf,
    legacy_prefix: String,
}

impl RewriteTableCache {
    /// Creates an empty cache reading rules from `source`.
    #[must_use]
    pub fn new(
        source: impl Into<PathBuf>,
        legacy_prefix: impl Into<String>,
        sliding_expiration: Duration,
    ) -> Self {
        Self {
            cache: ExpiringCache::new(ExpiryPolicy::Sliding(sliding_expiration)),
            source: source.into(),
            legacy_prefix: legacy_prefix.into(),
        }
    }

    /// Path of the rewrite configuration file.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Returns the cached table if present and not expired.
    pub async fn get(&self) -> Option<Arc<RewriteTable>> {
        self.cache.get(&REWRITE_MAP_KEY).await
    }

    /// Rebuilds the table from disk and replaces the cached instance.
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when the file does not exist and `Internal`
    /// when it cannot be read.
    pub async fn rebuild(&self) -> Result<Arc<RewriteTable>, ImageError> {
        info!(path = %self.source.display(), "Loading rewrite table");

        let content = match tokio::fs::read_to_string(&self.source).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!(path = %self.source.display(), "Rewrite configuration not found");
                return Err(ImageError::config_missing(&self.source));
            }
            Err(e) => {
                error!(path = %self.source.display(), error = %e, "Failed to read rewrite configuration");
                return Err(ImageError::internal(format!(
                    "failed to read {}: {e}",
                    self.source.display()
                )));
            }
        };

        let parsed = parse_rewrites(&content, &self.legacy_prefix);
        let table = Arc::new(RewriteTable::new(parsed.entries));

        if self.cache.contains(&REWRITE_MAP_KEY).await {
            info!(key = REWRITE_MAP_KEY, "Replacing existing rewrite table");
            self.cache.remove(&REWRITE_MAP_KEY).await;
        }
        self.cache.insert(REWRITE_MAP_KEY, Arc::clone(&table)).await;

        info!(
            count = table.len(),
            skipped = parsed.skipped,
            "Rewrite table cached"
        );
        Ok(table)
    }

    /// Looks up a single key in the cached table without rebuilding.
    ///
    /// Returns `None` when the key is unknown or the table is not loaded.
    pub async fn lookup(&self, key: &str) -> Option<String> {
        let Some(table) = self.get().await else {
            error!(key = %key, "Rewrite table is not initialized");
            return None;
        };

        let value = table.lookup(key).map(str::to_string);
        if value.is_none() {
            warn!(key = %key, "Rewrite key not found");
        } else {
            debug!(key = %key, "Rewrite key found");
        }
        value
    }
}

#[async_trait]
impl CacheInventory for RewriteTableCache {
    fn name(&self) -> &'static str {
        "rewrites"
    }

    async fn keys(&self) -> Vec<String> {
        self.cache
            .keys()
            .await
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    async fn clear(&self) -> usize {
        let count = self.cache.clear().await;
        info!(count, "Cleared rewrite cache");
        count
    }

    async fn purge_expired(&self) -> usize {
        self.cache.purge_expired().await
    }

    async fn snapshot(&self) -> CacheSnapshot {
        let mut extra = serde_json::Map::new();
        extra.insert(
            "source".to_string(),
            serde_json::Value::String(self.source().display().to_string()),
        );
        // Peek so the diagnostic dump does not slide the window.
        let table = self.cache.peek(&REWRITE_MAP_KEY).await;
        extra.insert(
            "loaded".to_string(),
            serde_json::Value::Bool(table.is_some()),
        );
        if let Some(table) = table {
            extra.insert("entries".to_string(), serde_json::json!(table.len()));
            extra.insert(
                "built_at".to_string(),
                serde_json::Value::String(table.built_at().to_rfc3339()),
            );
        }

        CacheSnapshot {
            name: self.name(),
            policy: self.cache.policy().to_string(),
            enabled: true,
            keys: self.keys().await,
            stats: self.cache.stats().await,
            extra,
        }
    }
}
