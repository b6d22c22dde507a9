//! Cache administration endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use crate::presentation::http::state::AppState;

/// Handle GET /api/cache.
pub(crate) async fn get_cache(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.admin.snapshot().await)
}

/// Handle DELETE /api/cache.
pub(crate) async fn clear_cache(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.admin.clear_all().await)
}

/// Handle GET /api/cache/rewrites/{*key}.
pub(crate) async fn get_rewrite(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let mut body = serde_json::Map::new();
    if let Some(value) = state.rewrites.lookup(&key).await {
        body.insert(key, serde_json::Value::String(value));
    }
    Json(body)
}
