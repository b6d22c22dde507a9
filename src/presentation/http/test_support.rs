//! Router harness over a temporary content root.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::Response;
use bytes::Bytes;
use tempfile::TempDir;

use super::{AppState, create_router};
use crate::application::{CacheAdminService, ImageResolutionService, PathResolver};
use crate::domain::ports::CacheInventory;
use crate::infrastructure::cache::{DEFAULT_DERIVATIVE_TTL, DerivativeCache, RewriteTableCache};
use crate::infrastructure::config::CacheConfig;
use crate::infrastructure::image::{DirectoryCatalog, ImageStore, ImageTranscoder, sample_jpeg};

const REWRITES: &str = "\
/img/scooter/250/babetta-classic-50 /img/scooter/250/LM0037.jpg;
/img/moto/old moto/new.jpg
";

pub(crate) struct Harness {
    dir: TempDir,
    pub(crate) state: Arc<AppState>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let image_root = dir.path().join("images");
        std::fs::create_dir_all(&image_root).unwrap();
        std::fs::write(image_root.join("nenalezeno.webp"), b"sentinel").unwrap();
        std::fs::create_dir_all(dir.path().join("conf")).unwrap();
        std::fs::write(dir.path().join("conf/rewrites.conf"), REWRITES).unwrap();

        let store = ImageStore::new(&image_root, "nenalezeno.webp");
        let rewrites = Arc::new(RewriteTableCache::new(
            dir.path().join("conf/rewrites.conf"),
            "/img/",
            Duration::from_secs(7200),
        ));
        let derivatives = Arc::new(DerivativeCache::new(DEFAULT_DERIVATIVE_TTL, None));
        let resolver = Arc::new(PathResolver::new(
            Arc::clone(&rewrites),
            store.clone(),
            "schema",
        ));
        let images = Arc::new(ImageResolutionService::new(
            resolver,
            Arc::new(DirectoryCatalog::new(&image_root)),
            Arc::new(ImageTranscoder::new()),
            Arc::clone(&derivatives),
            store,
        ));
        let admin = Arc::new(CacheAdminService::new(vec![
            Arc::clone(&rewrites) as Arc<dyn CacheInventory>,
            derivatives as Arc<dyn CacheInventory>,
        ]));

        let state = Arc::new(AppState {
            images,
            rewrites,
            admin,
            cache_settings: CacheConfig::default(),
            max_upload_mb: 10,
            default_folder: "product".to_string(),
        });
        Self { dir, state }
    }

    pub(crate) fn router(&self) -> Router {
        create_router(Arc::clone(&self.state))
    }

    pub(crate) fn image_path(&self, relative: &str) -> PathBuf {
        self.dir.path().join("images").join(relative)
    }

    pub(crate) fn rewrites_path(&self) -> PathBuf {
        self.dir.path().join("conf/rewrites.conf")
    }

    pub(crate) fn write_jpeg(&self, relative: &str) {
        self.write_jpeg_sized(relative, 64, 48);
    }

    pub(crate) fn write_jpeg_sized(&self, relative: &str, width: u32, height: u32) {
        let path = self.image_path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, sample_jpeg(width, height)).unwrap();
    }
}

pub(crate) async fn body_bytes(response: Response<Body>) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

pub(crate) async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
