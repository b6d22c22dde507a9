//! Router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::security;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/upload/cache-rewrites",
            get(handlers::derivatives::rebuild_rewrites),
        )
        .route("/api/upload/{id}", get(handlers::derivatives::get_derivative))
        .route(
            "/api/cache",
            get(handlers::cache::get_cache).delete(handlers::cache::clear_cache),
        )
        .route(
            "/api/cache/rewrites/{*key}",
            get(handlers::cache::get_rewrite),
        )
        .route("/api/general/ping", get(handlers::general::ping))
        .route("/api/general/health", get(handlers::general::health))
        .route("/api/general/settings", get(handlers::general::settings));

    let image_routes = Router::new()
        .route("/img", get(handlers::images::missing_identifier))
        .route("/img/", get(handlers::images::missing_identifier))
        .route("/img/{*identifier}", get(handlers::images::serve_image));

    Router::new()
        .merge(api_routes)
        .merge(image_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::content_type_options_layer()),
        )
        .with_state(state)
}
