//! Liveness and settings endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::infrastructure::config::CacheConfig;
use crate::presentation::http::state::AppState;

/// Handle GET /api/general/ping.
pub(crate) async fn ping() -> &'static str {
    "Pong"
}

/// Handle GET /api/general/health.
pub(crate) async fn health() -> &'static str {
    "Healthy"
}

#[derive(Serialize)]
struct SettingsResponse {
    #[serde(flatten)]
    cache: CacheConfig,
    max_upload_mb: u32,
}

/// Handle GET /api/general/settings.
pub(crate) async fn settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(SettingsResponse {
        cache: state.cache_settings.clone(),
        max_upload_mb: state.max_upload_mb,
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::presentation::http::test_support::{Harness, body_bytes, body_json};

    #[tokio::test]
    async fn test_ping_and_health() {
        let harness = Harness::new();

        for (uri, expected) in [
            ("/api/general/ping", "Pong"),
            ("/api/general/health", "Healthy"),
        ] {
            let response = harness
                .router()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_bytes(response).await.as_ref(), expected.as_bytes());
        }
    }

    #[tokio::test]
    async fn test_settings_reports_cache_config() {
        let harness = Harness::new();

        let response = harness
            .router()
            .oneshot(Request::get("/api/general/settings").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["enable_cache"], true);
        assert_eq!(json["cache_duration_secs"], 7200);
        assert_eq!(json["max_upload_mb"], 10);
    }
}
