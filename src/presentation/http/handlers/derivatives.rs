//! Derivative endpoints under /api/upload.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

use super::image_response;
use crate::domain::entities::{DerivativeRequest, ResizeMode, SizePreset};
use crate::presentation::http::error::ServerError;
use crate::presentation::http::state::AppState;

/// Query parameters of GET /api/upload/{id}.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DerivativeQuery {
    size: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    resize_mode: Option<String>,
    folder: Option<String>,
}

impl DerivativeQuery {
    fn into_request(self, id: String, default_folder: &str) -> Result<DerivativeRequest, ServerError> {
        let max = DerivativeRequest::MAX_DIMENSION;
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value.is_some_and(|v| v > max) {
                return Err(ServerError::BadRequest(format!("{name} must not exceed {max}")));
            }
        }

        let folder = self
            .folder
            .filter(|folder| !folder.trim().is_empty())
            .unwrap_or_else(|| default_folder.to_string());

        Ok(DerivativeRequest::new(id)
            .with_size(SizePreset::parse(self.size.as_deref().unwrap_or_default()))
            .with_dimensions(self.width, self.height)
            .with_resize_mode(ResizeMode::parse(self.resize_mode.as_deref().unwrap_or_default()))
            .with_folder(folder))
    }
}

/// Handle GET /api/upload/{id}.
pub(crate) async fn get_derivative(
    Path(id): Path<String>,
    Query(query): Query<DerivativeQuery>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServerError> {
    let request = query.into_request(id, &state.default_folder)?;
    let result = state.images.get_image(&request).await?;
    let content_type = result.content_type();
    Ok(image_response(
        result.bytes,
        content_type,
        state.cache_control(),
        &headers,
    ))
}

/// Handle GET /api/upload/cache-rewrites.
pub(crate) async fn rebuild_rewrites(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let table = state.rewrites.rebuild().await?;
    Ok(Json(json!({
        "count": table.len(),
        "built_at": table.built_at().to_rfc3339(),
    })))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::presentation::http::test_support::{Harness, body_json};

    #[test]
    fn test_query_defaults_to_configured_folder() {
        let request = DerivativeQuery::default()
            .into_request("a.webp".into(), "product")
            .unwrap();

        assert_eq!(request.folder, "product");
        assert_eq!(request.size, SizePreset::None);
        assert_eq!(request.resize_mode, ResizeMode::Max);
    }

    #[test]
    fn test_query_rejects_oversized_dimensions() {
        let query = DerivativeQuery {
            width: Some(DerivativeRequest::MAX_DIMENSION + 1),
            ..DerivativeQuery::default()
        };

        assert!(matches!(
            query.into_request("a.webp".into(), "product"),
            Err(ServerError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_small_preset_returns_resized_webp() {
        let harness = Harness::new();
        harness.write_jpeg("product/LM0037.jpg");

        let response = harness
            .router()
            .oneshot(
                Request::get("/api/upload/LM0037.webp?size=small")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/webp");
        assert!(response.headers().contains_key(header::ETAG));
    }

    #[tokio::test]
    async fn test_preset_on_thin_image_is_bad_request() {
        let harness = Harness::new();
        harness.write_jpeg_sized("product/strip.jpg", 1, 600);

        let response = harness
            .router()
            .oneshot(
                Request::get("/api/upload/strip.webp?size=small")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_explicit_folder_and_dimensions() {
        let harness = Harness::new();
        harness.write_jpeg("banner/top.jpg");

        let response = harness
            .router()
            .oneshot(
                Request::get("/api/upload/top.png?width=20&height=10&resizeMode=crop&folder=banner")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    }

    #[tokio::test]
    async fn test_unknown_identifier_is_not_found() {
        let harness = Harness::new();

        let response = harness
            .router()
            .oneshot(Request::get("/api/upload/missing.webp").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Image not found");
    }

    #[tokio::test]
    async fn test_non_numeric_width_is_bad_request() {
        let harness = Harness::new();

        let response = harness
            .router()
            .oneshot(Request::get("/api/upload/a.webp?width=wide").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cache_rewrites_reports_count() {
        let harness = Harness::new();

        let response = harness
            .router()
            .oneshot(Request::get("/api/upload/cache-rewrites").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["count"], 2);
    }

    #[tokio::test]
    async fn test_cache_rewrites_without_config_is_not_found() {
        let harness = Harness::new();
        std::fs::remove_file(harness.rewrites_path()).unwrap();

        let response = harness
            .router()
            .oneshot(Request::get("/api/upload/cache-rewrites").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["error"],
            "Rewrite configuration not found"
        );
    }
}
