//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use crate::application::{CacheAdminService, ImageResolutionService};
use crate::infrastructure::cache::RewriteTableCache;
use crate::infrastructure::config::CacheConfig;

/// Application state shared across all handlers.
pub struct AppState {
    /// Image retrieval and serving.
    pub images: Arc<ImageResolutionService>,
    /// Rewrite table, rebuilt on demand.
    pub rewrites: Arc<RewriteTableCache>,
    /// Cache administration.
    pub admin: Arc<CacheAdminService>,
    /// Effective cache settings, reported by the settings endpoint.
    pub cache_settings: CacheConfig,
    /// Upload size limit in megabytes, reported by the settings endpoint.
    pub max_upload_mb: u32,
    /// Folder used when a derivative request names none.
    pub default_folder: String,
}

impl AppState {
    /// `Cache-Control` value for image responses.
    #[must_use]
    pub(crate) fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_settings.cache_duration_secs)
    }
}
