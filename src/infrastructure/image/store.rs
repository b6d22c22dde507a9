//! File-system access to the image root.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, error, warn};

use crate::domain::errors::ImageError;

/// Rejects paths that could escape the image root.
///
/// # Errors
///
/// Returns `InvalidArgument` for blank values, backslashes, absolute paths
/// and `..` components.
pub fn ensure_relative(value: &str) -> Result<(), ImageError> {
    if value.trim().is_empty() {
        return Err(ImageError::invalid_argument("path must not be blank"));
    }
    if value.contains('\\') {
        return Err(ImageError::invalid_argument(format!(
            "path must not contain backslashes: {value}"
        )));
    }
    let escapes = Path::new(value).components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(ImageError::invalid_argument(format!(
            "path must stay under the image root: {value}"
        )));
    }
    Ok(())
}

/// Reads and writes files under the image root.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    not_found: PathBuf,
}

impl ImageStore {
    /// Creates a store rooted at `root` with the sentinel file `not_found`
    /// (relative to the root).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, not_found: impl AsRef<Path>) -> Self {
        let root = root.into();
        let not_found = root.join(not_found);
        Self { root, not_found }
    }

    /// Image root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a path relative to the root.
    #[must_use]
    pub fn path_for(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Location of the not-found sentinel image.
    #[must_use]
    pub fn sentinel_path(&self) -> &Path {
        &self.not_found
    }

    /// Creates the root directory if missing.
    ///
    /// # Errors
    ///
    /// Returns `Internal` when the directory cannot be created.
    pub async fn ensure_root(&self) -> Result<(), ImageError> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            error!(path = %self.root.display(), error = %e, "Failed to create image root");
            ImageError::internal(format!("failed to create {}: {e}", self.root.display()))
        })?;
        if !self.exists(&self.not_found).await {
            warn!(path = %self.not_found.display(), "Not-found sentinel image is missing");
        }
        Ok(())
    }

    /// Returns whether `path` is an existing regular file.
    pub async fn exists(&self, path: &Path) -> bool {
        fs::metadata(path).await.is_ok_and(|meta| meta.is_file())
    }

    /// Reads a whole file. Missing, unreadable and empty files are `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` with the cause as the reason.
    pub async fn read(&self, path: &Path) -> Result<Bytes, ImageError> {
        let identifier = path.display().to_string();
        match fs::read(path).await {
            Ok(bytes) if bytes.is_empty() => {
                warn!(path = %identifier, "Image file is empty");
                Err(ImageError::not_found(identifier, "file is empty"))
            }
            Ok(bytes) => {
                debug!(path = %identifier, size = bytes.len(), "Read image file");
                Ok(Bytes::from(bytes))
            }
            Err(e) => {
                error!(path = %identifier, error = %e, "Failed to read image file");
                Err(ImageError::not_found(identifier, "file could not be read"))
            }
        }
    }

    /// Writes `bytes` to `path` through a temporary file in the same directory
    /// so readers never observe a partial file.
    ///
    /// # Errors
    ///
    /// Returns `Internal` when the temporary file cannot be written or renamed.
    pub async fn write_atomic(&self, path: &Path, bytes: Bytes) -> Result<(), ImageError> {
        let target = path.to_path_buf();
        let parent = target
            .parent()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        let written = tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
            let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
            temp.write_all(&bytes)?;
            temp.as_file().sync_all()?;
            temp.persist(&target).map_err(|e| e.error)?;
            Ok(target)
        })
        .await
        .map_err(|e| ImageError::internal(format!("write task failed: {e}")))?;

        match written {
            Ok(target) => {
                debug!(path = %target.display(), "Persisted image file");
                Ok(())
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to persist image file");
                Err(ImageError::internal(format!(
                    "failed to write {}: {e}",
                    path.display()
                )))
            }
        }
    }
}
