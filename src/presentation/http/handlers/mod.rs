//! HTTP request handlers.

pub(crate) mod cache;
pub(crate) mod derivatives;
pub(crate) mod general;
pub(crate) mod images;

use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use sha2::{Digest, Sha256};

/// Builds an image response with validators, or `304` when the client copy
/// is current.
pub(crate) fn image_response(
    bytes: Bytes,
    content_type: &'static str,
    cache_control: String,
    headers: &HeaderMap,
) -> Response {
    let etag = compute_etag(&bytes);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return (
            StatusCode::NOT_MODIFIED,
            [(header::ETAG, etag), (header::CACHE_CONTROL, cache_control)],
        )
            .into_response();
    }

    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, cache_control),
        ],
        bytes,
    )
        .into_response()
}

/// Compute a strong `ETag` from the payload.
///
/// SHA-256 truncated to 64 bits (16 hex chars).
pub(crate) fn compute_etag(content: &[u8]) -> String {
    let hash = Sha256::digest(content);
    format!("\"{}\"", &hex::encode(hash)[..16])
}
