//! Derivative requests, their cache fingerprints and results.

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;

use super::image::ImageFormat;

/// Predefined output size of a derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    /// No preset; explicit dimensions (if any) apply.
    #[default]
    None,
    /// Fixed small width, proportional height.
    Small,
    /// Fixed medium width, proportional height.
    Medium,
    /// Original size, metadata stripped.
    Clean,
    /// Unrecognised preset; original size, explicit dimensions ignored.
    Unknown,
}

impl SizePreset {
    /// Width of the `small` preset.
    pub const SMALL_WIDTH: u32 = 200;
    /// Width of the `medium` preset.
    pub const MEDIUM_WIDTH: u32 = 800;

    /// Parses a query value. Empty means no preset; any other unrecognised
    /// value still counts as a preset.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("small") {
            Self::Small
        } else if value.eq_ignore_ascii_case("medium") {
            Self::Medium
        } else if value.eq_ignore_ascii_case("clean") {
            Self::Clean
        } else if value.is_empty() {
            Self::None
        } else {
            Self::Unknown
        }
    }

    /// Stable token used in fingerprints and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Clean => "clean",
            Self::Unknown => "unknown",
        }
    }

    /// Target width for resizing presets.
    #[must_use]
    pub const fn target_width(self) -> Option<u32> {
        match self {
            Self::Small => Some(Self::SMALL_WIDTH),
            Self::Medium => Some(Self::MEDIUM_WIDTH),
            Self::None | Self::Clean | Self::Unknown => None,
        }
    }
}

/// Resize mode requested by the client.
///
/// Explicit dimensions are always applied as a centred crop; the mode is
/// accepted for compatibility and reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Fit within the box.
    #[default]
    Max,
    /// Fill the box and crop the overflow.
    Crop,
    /// Fit within the box and pad the remainder.
    Pad,
    /// Cover the box with the smaller side.
    Min,
    /// Ignore the aspect ratio.
    Stretch,
}

impl ResizeMode {
    /// Parses a query value case-insensitively, defaulting to [`ResizeMode::Max`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "crop" => Self::Crop,
            "pad" => Self::Pad,
            "min" => Self::Min,
            "stretch" => Self::Stretch,
            _ => Self::Max,
        }
    }
}

/// Cache key derived from a derivative request.
///
/// The identifier is length-prefixed so no identifier can forge the fields
/// that follow it, and absent dimensions serialize as `-` rather than `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a derivative fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivativeRequest {
    /// Requested identifier; its extension selects the output encoder.
    pub identifier: String,
    /// Size preset.
    pub size: SizePreset,
    /// Explicit width.
    pub width: Option<u32>,
    /// Explicit height.
    pub height: Option<u32>,
    /// Resize mode as requested.
    pub resize_mode: ResizeMode,
    /// Catalog folder to look the image up in.
    pub folder: String,
}

impl DerivativeRequest {
    /// Folder used when the client does not name one.
    pub const DEFAULT_FOLDER: &'static str = "product";
    /// Largest width or height of a derivative, requested or derived.
    pub const MAX_DIMENSION: u32 = 10_000;

    /// Creates a request for the original image, re-encoded by extension.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            size: SizePreset::None,
            width: None,
            height: None,
            resize_mode: ResizeMode::default(),
            folder: Self::DEFAULT_FOLDER.to_string(),
        }
    }

    /// Sets the size preset.
    #[must_use]
    pub const fn with_size(mut self, size: SizePreset) -> Self {
        self.size = size;
        self
    }

    /// Sets explicit dimensions.
    #[must_use]
    pub const fn with_dimensions(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the resize mode.
    #[must_use]
    pub const fn with_resize_mode(mut self, mode: ResizeMode) -> Self {
        self.resize_mode = mode;
        self
    }

    /// Sets the catalog folder.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Builds the cache fingerprint from identifier, preset and dimensions.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        fn dimension(value: Option<u32>) -> String {
            value.map_or_else(|| "-".to_string(), |v| v.to_string())
        }

        Fingerprint(format!(
            "image:{}:{}|{}|w={}|h={}",
            self.identifier.len(),
            self.identifier,
            self.size.as_str(),
            dimension(self.width),
            dimension(self.height),
        ))
    }

    /// File name of the identifier without its extension.
    #[must_use]
    pub fn name(&self) -> &str {
        Path::new(&self.identifier)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.identifier)
    }

    /// Encoder selected by the identifier's extension; unknown falls back to JPEG.
    #[must_use]
    pub fn output_format(&self) -> ImageFormat {
        ImageFormat::from_path(Path::new(&self.identifier)).unwrap_or(ImageFormat::Jpeg)
    }
}

/// Encoded image bytes and their content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivativeResult {
    /// Encoded payload.
    pub bytes: Bytes,
    /// Encoder that produced the payload.
    pub format: ImageFormat,
}

impl DerivativeResult {
    /// Creates a result.
    #[must_use]
    pub const fn new(bytes: Bytes, format: ImageFormat) -> Self {
        Self { bytes, format }
    }

    /// MIME type of the payload.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}
