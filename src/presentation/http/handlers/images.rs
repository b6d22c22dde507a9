//! Image serving endpoint.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use super::image_response;
use crate::domain::errors::ImageError;
use crate::presentation::http::error::ServerError;
use crate::presentation::http::state::AppState;

/// Handle GET /img/{*identifier}.
pub(crate) async fn serve_image(
    Path(identifier): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServerError> {
    let served = state.images.serve_image(&identifier).await?;
    Ok(image_response(
        served.bytes,
        served.content_type,
        state.cache_control(),
        &headers,
    ))
}

/// Handle GET /img/ without an identifier.
pub(crate) async fn missing_identifier() -> ServerError {
    ImageError::invalid_argument("no image name given").into()
}
