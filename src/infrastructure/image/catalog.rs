//! Directory-backed image catalog.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, trace};

use super::store::ensure_relative;
use crate::domain::entities::ImageRecord;
use crate::domain::errors::ImageError;
use crate::domain::ports::ImageCatalogPort;

/// Extensions probed for a record, in order of preference.
pub const PREFERRED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Treats `<root>/<folder>/<name>.<ext>` as the record for `name`.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    /// Creates a catalog over the image root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageCatalogPort for DirectoryCatalog {
    async fn find(&self, folder: &str, name: &str) -> Result<Option<ImageRecord>, ImageError> {
        ensure_relative(folder)?;
        ensure_relative(name)?;
        if name.contains('/') {
            return Err(ImageError::invalid_argument(format!(
                "image name must not contain '/': {name}"
            )));
        }

        let dir = self.root.join(folder);
        for extension in PREFERRED_EXTENSIONS {
            let path = dir.join(format!("{name}.{extension}"));
            trace!(path = %path.display(), "Probing catalog");
            if fs::metadata(&path).await.is_ok_and(|meta| meta.is_file()) {
                debug!(folder, name, extension, "Catalog record found");
                return Ok(Some(ImageRecord {
                    name: name.to_string(),
                    folder: folder.to_string(),
                    path,
                    extension: extension.to_string(),
                }));
            }
        }

        debug!(folder, name, "No catalog record");
        Ok(None)
    }
}
