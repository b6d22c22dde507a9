//! Image formats, resolved file locations and catalog records.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Content type served for files whose extension is not a known image format.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Image encodings the service can read and produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG, also the fallback encoder.
    Jpeg,
    /// PNG.
    Png,
    /// WebP.
    Webp,
    /// GIF.
    Gif,
}

impl ImageFormat {
    /// Maps a file extension (with or without the leading dot) to a format.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.');
        if extension.eq_ignore_ascii_case("jpg") || extension.eq_ignore_ascii_case("jpeg") {
            Some(Self::Jpeg)
        } else if extension.eq_ignore_ascii_case("png") {
            Some(Self::Png)
        } else if extension.eq_ignore_ascii_case("webp") {
            Some(Self::Webp)
        } else if extension.eq_ignore_ascii_case("gif") {
            Some(Self::Gif)
        } else {
            None
        }
    }

    /// Maps the extension of `path` to a format.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// MIME type of the format.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Canonical file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Content type for a file path, derived from its extension.
#[must_use]
pub fn content_type_for_path(path: &Path) -> &'static str {
    ImageFormat::from_path(path).map_or(OCTET_STREAM, ImageFormat::content_type)
}

/// Outcome of resolving an identifier to a file on disk.
///
/// When nothing matched, `physical_path` points at the not-found sentinel and
/// `exists` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Final file-system path.
    pub physical_path: PathBuf,
    /// Whether the requested image itself was found.
    pub exists: bool,
    /// MIME type derived from the final extension.
    pub content_type: &'static str,
}

impl ResolvedImage {
    /// Creates a resolution pointing at an existing image.
    #[must_use]
    pub fn found(path: PathBuf) -> Self {
        let content_type = content_type_for_path(&path);
        Self {
            physical_path: path,
            exists: true,
            content_type,
        }
    }

    /// Creates a resolution pointing at the not-found sentinel.
    #[must_use]
    pub fn sentinel(path: PathBuf) -> Self {
        let content_type = content_type_for_path(&path);
        Self {
            physical_path: path,
            exists: false,
            content_type,
        }
    }

    /// Image format of the resolved file, if recognised.
    #[must_use]
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_path(&self.physical_path)
    }
}

impl From<&ImageRecord> for ResolvedImage {
    fn from(record: &ImageRecord) -> Self {
        Self::found(record.path.clone())
    }
}

/// Metadata about a stored image, as known to the backing catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// File name without extension.
    pub name: String,
    /// Folder the image was uploaded into.
    pub folder: String,
    /// Location of the original file.
    pub path: PathBuf,
    /// Extension of the original file, without the dot.
    pub extension: String,
}
