//! End-to-end image retrieval: derivatives and served originals.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, info, trace, warn};

use super::path_resolver::PathResolver;
use crate::application::dto::ServedImage;
use crate::domain::entities::{
    DerivativeRequest, DerivativeResult, ImageFormat, ResolvedImage,
};
use crate::domain::errors::ImageError;
use crate::domain::ports::{ImageCatalogPort, TranscoderPort};
use crate::infrastructure::cache::DerivativeCache;
use crate::infrastructure::image::{ImageStore, ensure_relative};

/// Composes resolution, caching and transcoding.
pub struct ImageResolutionService {
    resolver: Arc<PathResolver>,
    catalog: Arc<dyn ImageCatalogPort>,
    transcoder: Arc<dyn TranscoderPort>,
    derivatives: Arc<DerivativeCache>,
    store: ImageStore,
    convert_to_webp: bool,
}

impl ImageResolutionService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        resolver: Arc<PathResolver>,
        catalog: Arc<dyn ImageCatalogPort>,
        transcoder: Arc<dyn TranscoderPort>,
        derivatives: Arc<DerivativeCache>,
        store: ImageStore,
    ) -> Self {
        Self {
            resolver,
            catalog,
            transcoder,
            derivatives,
            store,
            convert_to_webp: true,
        }
    }

    /// Enables or disables the one-time JPEG to WebP conversion.
    #[must_use]
    pub const fn with_webp_conversion(mut self, enabled: bool) -> Self {
        self.convert_to_webp = enabled;
        self
    }

    /// Returns the derivative described by `request`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for blank or escaping names, `NotFound` when
    /// the catalog has no record or the file is unreadable, and the codec
    /// errors of the transcoder.
    pub async fn get_image(
        &self,
        request: &DerivativeRequest,
    ) -> Result<DerivativeResult, ImageError> {
        if request.identifier.trim().is_empty() {
            return Err(ImageError::invalid_argument("identifier must not be blank"));
        }

        let fingerprint = request.fingerprint();
        if let Some(hit) = self.derivatives.lookup(&fingerprint).await {
            trace!(fingerprint = %fingerprint, "Derivative cache hit");
            return Ok(hit);
        }

        ensure_relative(&request.folder)?;
        let name = request.name();
        let record = self
            .catalog
            .find(&request.folder, name)
            .await?
            .ok_or_else(|| {
                warn!(identifier = %request.identifier, folder = %request.folder, "No catalog record");
                ImageError::not_found(&request.identifier, "no catalog record")
            })?;

        let resolved = ResolvedImage::from(&record);
        let source = self.store.read(&resolved.physical_path).await?;

        debug!(
            identifier = %request.identifier,
            path = %resolved.physical_path.display(),
            size = request.size.as_str(),
            width = ?request.width,
            height = ?request.height,
            resize_mode = ?request.resize_mode,
            "Building derivative"
        );

        let transcoder = Arc::clone(&self.transcoder);
        let owned = request.clone();
        let result = tokio::task::spawn_blocking(move || transcoder.transcode(&source, &owned))
            .await
            .map_err(|e| {
                error!(identifier = %request.identifier, error = %e, "Transcode task failed");
                ImageError::encoding(request.output_format().to_string(), e.to_string())
            })?
            .inspect_err(|e| {
                error!(identifier = %request.identifier, error = %e, "Failed to build derivative");
            })?;

        self.derivatives.store(fingerprint, result.clone()).await;
        Ok(result)
    }

    /// Returns the bytes served for `identifier`, converting JPEGs to WebP once.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for invalid identifiers and `NotFound` when
    /// neither the image nor the sentinel can be read.
    pub async fn serve_image(&self, identifier: &str) -> Result<ServedImage, ImageError> {
        let resolved = self.resolver.resolve(identifier).await?;

        let eligible = self.convert_to_webp
            && resolved.exists
            && resolved.format() == Some(ImageFormat::Jpeg);
        let sibling = resolved.physical_path.with_extension(ImageFormat::Webp.extension());

        if eligible && self.store.exists(&sibling).await {
            match self.store.read(&sibling).await {
                Ok(bytes) => return Ok(served(sibling, bytes, ImageFormat::Webp, true)),
                Err(e) => warn!(path = %sibling.display(), error = %e, "Ignoring unreadable WebP variant"),
            }
        }

        let bytes = self.store.read(&resolved.physical_path).await?;

        if eligible {
            match self.convert_and_persist(bytes.clone(), &sibling).await {
                Ok(webp) => return Ok(served(sibling, webp, ImageFormat::Webp, true)),
                Err(e) => {
                    warn!(
                        path = %resolved.physical_path.display(),
                        error = %e,
                        "WebP conversion failed, serving original"
                    );
                }
            }
        }

        Ok(ServedImage {
            bytes,
            content_type: resolved.content_type,
            path: resolved.physical_path,
            exists: resolved.exists,
        })
    }

    async fn convert_and_persist(&self, source: Bytes, target: &Path) -> Result<Bytes, ImageError> {
        let transcoder = Arc::clone(&self.transcoder);
        let converted =
            tokio::task::spawn_blocking(move || transcoder.convert(&source, ImageFormat::Webp))
                .await
                .map_err(|e| ImageError::encoding(ImageFormat::Webp.to_string(), e.to_string()))??;

        match self.store.write_atomic(target, converted.bytes.clone()).await {
            Ok(()) => info!(path = %target.display(), "Persisted WebP variant"),
            Err(e) => warn!(path = %target.display(), error = %e, "Failed to persist WebP variant"),
        }
        Ok(converted.bytes)
    }
}

fn served(path: PathBuf, bytes: Bytes, format: ImageFormat, exists: bool) -> ServedImage {
    ServedImage {
        bytes,
        content_type: format.content_type(),
        path,
        exists,
    }
}
