//! Image resolution error types.

use std::path::PathBuf;

use thiserror::Error;

/// Image resolution error variants.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum ImageError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("rewrite configuration not found: {}", path.display())]
    ConfigMissing { path: PathBuf },

    #[error("image not found: {identifier} ({reason})")]
    NotFound { identifier: String, reason: String },

    #[error("unsupported image format: {message}")]
    UnsupportedFormat { message: String },

    #[error("failed to encode {format}: {message}")]
    EncodingFailed { format: String, message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ImageError {
    /// Creates invalid argument error.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Creates config missing error.
    #[must_use]
    pub fn config_missing(path: impl Into<PathBuf>) -> Self {
        Self::ConfigMissing { path: path.into() }
    }

    /// Creates not found error.
    #[must_use]
    pub fn not_found(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotFound {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Creates unsupported format error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /// Creates encoding failed error.
    #[must_use]
    pub fn encoding(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Creates internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns whether the error is reported to clients as "not found".
    ///
    /// Codec failures are folded in so internal causes stay hidden.
    #[must_use]
    pub const fn is_not_found_class(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::UnsupportedFormat { .. } | Self::EncodingFailed { .. }
        )
    }
}
