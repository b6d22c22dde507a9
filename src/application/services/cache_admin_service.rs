//! Administrative operations over every registered cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, interval_at};
use tracing::{debug, info};

use crate::application::dto::ClearReport;
use crate::domain::entities::CacheSnapshot;
use crate::domain::ports::CacheInventory;

/// Clears, purges and inspects the registered caches.
pub struct CacheAdminService {
    caches: Vec<Arc<dyn CacheInventory>>,
}

impl CacheAdminService {
    /// Creates the service over `caches`.
    #[must_use]
    pub fn new(caches: Vec<Arc<dyn CacheInventory>>) -> Self {
        Self { caches }
    }

    /// Removes every entry from every cache.
    ///
    /// Requests in flight keep the values they already hold; later lookups
    /// miss and repopulate.
    pub async fn clear_all(&self) -> ClearReport {
        let mut report = ClearReport::default();
        for cache in &self.caches {
            let removed = cache.clear().await;
            report.push(cache.name(), removed);
        }
        info!(total = report.total, caches = report.caches.len(), "Cleared all caches");
        report
    }

    /// Removes expired entries from every cache.
    pub async fn purge_expired(&self) -> usize {
        let mut removed = 0;
        for cache in &self.caches {
            let count = cache.purge_expired().await;
            if count > 0 {
                debug!(cache = cache.name(), count, "Purged expired entries");
            }
            removed += count;
        }
        removed
    }

    /// Diagnostic view of every cache.
    pub async fn snapshot(&self) -> Vec<CacheSnapshot> {
        let mut snapshots = Vec::with_capacity(self.caches.len());
        for cache in &self.caches {
            snapshots.push(cache.snapshot().await);
        }
        snapshots
    }

    /// Starts a background task purging expired entries every `period`.
    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        info!(period_secs = period.as_secs(), "Starting cache sweeper");
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let removed = self.purge_expired().await;
                if removed > 0 {
                    info!(removed, "Swept expired cache entries");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bytes::Bytes;
    use tempfile::TempDir;

    use super::*;
    use crate::application::services::{ImageResolutionService, PathResolver};
    use crate::domain::entities::{DerivativeRequest, DerivativeResult, ImageFormat, ImageRecord};
    use crate::domain::ports::mocks::{CountingTranscoder, MockImageCatalogPort};
    use crate::infrastructure::cache::{DerivativeCache, RewriteTableCache};
    use crate::infrastructure::image::ImageStore;

    struct Fixture {
        _dir: TempDir,
        rewrites: Arc<RewriteTableCache>,
        derivatives: Arc<DerivativeCache>,
        admin: Arc<CacheAdminService>,
    }

    impl Fixture {
        fn new(ttl: Duration) -> Self {
            let dir = TempDir::new().unwrap();
            let conf = dir.path().join("rewrites.conf");
            std::fs::write(&conf, "a moto/a.jpg\nb moto/b.jpg\n").unwrap();

            let rewrites = Arc::new(RewriteTableCache::new(conf, "/img/", Duration::from_secs(7200)));
            let derivatives = Arc::new(DerivativeCache::new(ttl, None));
            let admin = Arc::new(CacheAdminService::new(vec![
                rewrites.clone() as Arc<dyn CacheInventory>,
                derivatives.clone() as Arc<dyn CacheInventory>,
            ]));
            Self {
                _dir: dir,
                rewrites,
                derivatives,
                admin,
            }
        }
    }

    fn result() -> DerivativeResult {
        DerivativeResult::new(Bytes::from_static(b"x"), ImageFormat::Webp)
    }

    #[tokio::test]
    async fn test_clear_all_empties_every_cache() {
        let fx = Fixture::new(Duration::from_secs(60));
        fx.rewrites.rebuild().await.unwrap();
        for id in ["a.webp", "b.webp"] {
            fx.derivatives
                .store(DerivativeRequest::new(id).fingerprint(), result())
                .await;
        }

        let report = fx.admin.clear_all().await;

        assert_eq!(report.total, 3);
        assert_eq!(report.caches[0].name, "rewrites");
        assert_eq!(report.caches[0].removed, 1);
        assert_eq!(report.caches[1].removed, 2);
        assert!(fx.rewrites.get().await.is_none());
        assert!(fx.derivatives.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_on_empty_caches() {
        let fx = Fixture::new(Duration::from_secs(60));

        let report = fx.admin.clear_all().await;

        assert_eq!(report.total, 0);
        assert_eq!(report.caches.len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_lists_keys() {
        let fx = Fixture::new(Duration::from_secs(60));
        fx.rewrites.rebuild().await.unwrap();
        let fingerprint = DerivativeRequest::new("a.webp").fingerprint();
        fx.derivatives.store(fingerprint.clone(), result()).await;

        let snapshots = fx.admin.snapshot().await;

        assert_eq!(snapshots[0].keys, vec!["rewrite-map".to_string()]);
        assert_eq!(snapshots[0].extra["entries"], serde_json::json!(2));
        assert_eq!(snapshots[1].keys, vec![fingerprint.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_expired_derivatives() {
        let fx = Fixture::new(Duration::from_secs(30));
        fx.derivatives
            .store(DerivativeRequest::new("a.webp").fingerprint(), result())
            .await;

        let handle = Arc::clone(&fx.admin).spawn_sweeper(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(fx.derivatives.snapshot().await.stats.size, 0);
        handle.abort();
    }

    #[tokio::test]
    async fn test_clear_all_forces_fresh_transcode() {
        let dir = TempDir::new().unwrap();
        let original: PathBuf = dir.path().join("images/product/LM0037.jpg");
        std::fs::create_dir_all(original.parent().unwrap()).unwrap();
        std::fs::write(&original, b"jpeg").unwrap();
        std::fs::write(dir.path().join("rewrites.conf"), "").unwrap();

        let store = ImageStore::new(dir.path().join("images"), "nenalezeno.webp");
        let rewrites = Arc::new(RewriteTableCache::new(
            dir.path().join("rewrites.conf"),
            "/img/",
            Duration::from_secs(7200),
        ));
        let derivatives = Arc::new(DerivativeCache::new(Duration::from_secs(600), None));
        let admin = CacheAdminService::new(vec![
            rewrites.clone() as Arc<dyn CacheInventory>,
            derivatives.clone() as Arc<dyn CacheInventory>,
        ]);

        let mut catalog = MockImageCatalogPort::new();
        catalog.expect_find().times(2).returning(move |_, _| {
            Ok(Some(ImageRecord {
                name: "LM0037".to_string(),
                folder: "product".to_string(),
                path: original.clone(),
                extension: "jpg".to_string(),
            }))
        });
        let transcoder = Arc::new(CountingTranscoder::new());
        let service = ImageResolutionService::new(
            Arc::new(PathResolver::new(rewrites, store.clone(), "schema")),
            Arc::new(catalog),
            transcoder.clone(),
            derivatives,
            store,
        );
        let request = DerivativeRequest::new("LM0037.webp");

        let before = service.get_image(&request).await.unwrap();
        service.get_image(&request).await.unwrap();
        admin.clear_all().await;
        let after = service.get_image(&request).await.unwrap();

        assert_eq!(transcoder.transcodes(), 2);
        assert_ne!(before.bytes, after.bytes);
    }
}
