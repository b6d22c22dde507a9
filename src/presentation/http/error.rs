//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::domain::errors::ImageError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Failure reported by the image services.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Request rejected before reaching the services.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::BadRequest(reason) => (StatusCode::BAD_REQUEST, json!({"error": reason})),
            Self::Image(ImageError::InvalidArgument { reason }) => {
                (StatusCode::BAD_REQUEST, json!({"error": reason}))
            }
            Self::Image(ImageError::ConfigMissing { path }) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "Rewrite configuration not found",
                    "path": path.display().to_string(),
                }),
            ),
            Self::Image(e) if e.is_not_found_class() => {
                (StatusCode::NOT_FOUND, json!({"error": "Image not found"}))
            }
            Self::Image(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Internal server error"}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
