//! Resolution of requested identifiers to files under the image root.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::{ImageFormat, ResolvedImage, RewriteTable};
use crate::domain::errors::ImageError;
use crate::infrastructure::cache::RewriteTableCache;
use crate::infrastructure::image::{ImageStore, ensure_relative};

/// Maps identifiers to physical paths through the rewrite table,
/// extension inference and the not-found sentinel.
pub struct PathResolver {
    rewrites: Arc<RewriteTableCache>,
    store: ImageStore,
    schema_namespace: String,
}

impl PathResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(
        rewrites: Arc<RewriteTableCache>,
        store: ImageStore,
        schema_namespace: impl Into<String>,
    ) -> Self {
        Self {
            rewrites,
            store,
            schema_namespace: schema_namespace.into(),
        }
    }

    /// Resolves `identifier` to an existing file or the sentinel.
    ///
    /// A missing rewrite table is rebuilt and awaited before the lookup, so
    /// the first request after expiry already sees the fresh table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for blank identifiers and paths that would
    /// leave the image root. Missing files are not errors.
    pub async fn resolve(&self, identifier: &str) -> Result<ResolvedImage, ImageError> {
        let requested = identifier.trim().trim_start_matches('/');
        if requested.is_empty() {
            return Err(ImageError::invalid_argument("identifier must not be blank"));
        }
        ensure_relative(requested)?;

        let table = self.table().await;
        let mut name = match table.as_deref().and_then(|t| t.lookup(requested)) {
            Some(target) => {
                debug!(identifier = %requested, target = %target, "Applied rewrite");
                ensure_relative(target)?;
                target.to_string()
            }
            None => requested.to_string(),
        };

        if let Some(stem) = strip_jpg(&name) {
            name = stem.to_string();
        }

        if Path::new(&name).extension().is_none() {
            name = self.infer_extension(name).await;
        }

        let path = self.store.path_for(&name);
        if !self.store.exists(&path).await {
            warn!(identifier = %requested, path = %path.display(), "Image not found, serving sentinel");
            return Ok(ResolvedImage::sentinel(
                self.store.sentinel_path().to_path_buf(),
            ));
        }

        let resolved = ResolvedImage::found(path);
        debug!(
            identifier = %requested,
            path = %resolved.physical_path.display(),
            content_type = resolved.content_type,
            "Resolved image"
        );
        Ok(resolved)
    }

    async fn table(&self) -> Option<Arc<RewriteTable>> {
        if let Some(table) = self.rewrites.get().await {
            return Some(table);
        }

        warn!("Rewrite table not cached, rebuilding before resolving");
        match self.rewrites.rebuild().await {
            Ok(table) => Some(table),
            Err(e) => {
                warn!(error = %e, "Resolving without rewrites");
                None
            }
        }
    }

    async fn infer_extension(&self, name: String) -> String {
        let webp = format!("{name}.{}", ImageFormat::Webp.extension());
        if self.store.exists(&self.store.path_for(&webp)).await {
            debug!(name = %name, "Preferring converted WebP variant");
            return webp;
        }
        if self.in_schema_namespace(&name) {
            return webp;
        }
        format!("{name}.{}", ImageFormat::Jpeg.extension())
    }

    fn in_schema_namespace(&self, name: &str) -> bool {
        !self.schema_namespace.is_empty()
            && name
                .split('/')
                .next()
                .is_some_and(|first| first.eq_ignore_ascii_case(&self.schema_namespace))
    }
}

/// Returns `name` without a trailing `.jpg`, ignoring case.
fn strip_jpg(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(4)?;
    let (stem, suffix) = (name.get(..split)?, name.get(split..)?);
    (suffix.eq_ignore_ascii_case(".jpg") && !stem.is_empty()).then_some(stem)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;
    use test_case::test_case;

    use super::*;

    struct Fixture {
        dir: TempDir,
        resolver: PathResolver,
        rewrites: Arc<RewriteTableCache>,
    }

    impl Fixture {
        fn new(rules: Option<&str>, files: &[&str]) -> Self {
            let dir = TempDir::new().unwrap();
            let conf = dir.path().join("conf/rewrites.conf");
            if let Some(rules) = rules {
                std::fs::create_dir_all(conf.parent().unwrap()).unwrap();
                std::fs::write(&conf, rules).unwrap();
            }
            for file in files.iter().chain(std::iter::once(&"nenalezeno.webp")) {
                let path = dir.path().join("images").join(file);
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(path, b"bytes").unwrap();
            }

            let rewrites = Arc::new(RewriteTableCache::new(
                conf,
                "/img/",
                Duration::from_secs(7200),
            ));
            let store = ImageStore::new(dir.path().join("images"), "nenalezeno.webp");
            let resolver = PathResolver::new(Arc::clone(&rewrites), store, "schema");
            Self {
                dir,
                resolver,
                rewrites,
            }
        }

        fn image(&self, relative: &str) -> std::path::PathBuf {
            self.dir.path().join("images").join(relative)
        }
    }

    #[tokio::test]
    async fn test_rewrite_maps_to_physical_path() {
        let fx = Fixture::new(
            Some("/img/scooter/250/babetta-classic-50 /img/scooter/250/LM0037.jpg;"),
            &["scooter/250/LM0037.jpg"],
        );

        let resolved = fx
            .resolver
            .resolve("scooter/250/babetta-classic-50")
            .await
            .unwrap();

        assert!(resolved.exists);
        assert_eq!(resolved.physical_path, fx.image("scooter/250/LM0037.jpg"));
        assert_eq!(resolved.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_unknown_path_returns_sentinel() {
        let fx = Fixture::new(Some(""), &[]);

        let resolved = fx.resolver.resolve("unknown/path").await.unwrap();

        assert!(!resolved.exists);
        assert_eq!(resolved.physical_path, fx.image("nenalezeno.webp"));
        assert_eq!(resolved.content_type, "image/webp");
    }

    #[tokio::test]
    async fn test_webp_sibling_preferred_over_jpg() {
        let fx = Fixture::new(Some(""), &["moto/a.jpg", "moto/a.webp"]);

        let extensionless = fx.resolver.resolve("moto/a").await.unwrap();
        let legacy = fx.resolver.resolve("moto/a.JPG").await.unwrap();

        assert_eq!(extensionless.physical_path, fx.image("moto/a.webp"));
        assert_eq!(legacy.physical_path, fx.image("moto/a.webp"));
        assert_eq!(legacy.content_type, "image/webp");
    }

    #[tokio::test]
    async fn test_schema_namespace_defaults_to_webp() {
        let fx = Fixture::new(Some(""), &["schema/diagram.webp"]);

        let resolved = fx.resolver.resolve("schema/diagram").await.unwrap();
        assert_eq!(resolved.physical_path, fx.image("schema/diagram.webp"));
    }

    #[tokio::test]
    async fn test_explicit_extension_is_kept() {
        let fx = Fixture::new(Some(""), &["banner/top.png"]);

        let resolved = fx.resolver.resolve("banner/top.png").await.unwrap();
        assert_eq!(resolved.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let fx = Fixture::new(Some("a moto/a.jpg"), &["moto/a.jpg"]);

        let first = fx.resolver.resolve("a").await.unwrap();
        let second = fx.resolver.resolve("a").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_table_is_rebuilt_before_lookup() {
        let fx = Fixture::new(Some("legacy moto/a.jpg"), &["moto/a.jpg"]);
        assert!(fx.rewrites.get().await.is_none());

        let resolved = fx.resolver.resolve("legacy").await.unwrap();

        assert!(resolved.exists);
        assert!(fx.rewrites.get().await.is_some());
    }

    #[tokio::test]
    async fn test_missing_rewrite_file_still_resolves() {
        let fx = Fixture::new(None, &["moto/a.jpg"]);

        let resolved = fx.resolver.resolve("moto/a").await.unwrap();
        assert_eq!(resolved.physical_path, fx.image("moto/a.jpg"));
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case("../conf/rewrites.conf" ; "traversal")]
    #[test_case("a\\b" ; "backslash")]
    #[tokio::test]
    async fn test_rejects_invalid_identifiers(identifier: &str) {
        let fx = Fixture::new(Some(""), &[]);

        let err = fx.resolver.resolve(identifier).await.unwrap_err();
        assert!(matches!(err, ImageError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_rewrite_target_cannot_escape_root() {
        let fx = Fixture::new(Some("evil ../../etc/passwd"), &[]);

        let err = fx.resolver.resolve("evil").await.unwrap_err();
        assert!(matches!(err, ImageError::InvalidArgument { .. }));
    }

    #[test_case("a.jpg", Some("a") ; "lower")]
    #[test_case("dir/a.JPG", Some("dir/a") ; "upper")]
    #[test_case("a.jpeg", None ; "jpeg_untouched")]
    #[test_case(".jpg", None ; "bare_extension")]
    #[test_case("a.webp", None ; "webp")]
    fn test_strip_jpg(input: &str, expected: Option<&str>) {
        assert_eq!(strip_jpg(input), expected);
    }
}
