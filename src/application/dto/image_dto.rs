//! Served image DTO.

use std::path::PathBuf;

use bytes::Bytes;

/// Bytes returned for an image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedImage {
    /// Payload.
    pub bytes: Bytes,
    /// MIME type of the payload.
    pub content_type: &'static str,
    /// File the payload was read from or written to.
    pub path: PathBuf,
    /// False when the not-found sentinel was served.
    pub exists: bool,
}
