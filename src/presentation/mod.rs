//! Presentation layer exposing the services over HTTP.

/// axum router, handlers and error mapping.
pub mod http;

pub use http::{AppState, create_router, serve};
