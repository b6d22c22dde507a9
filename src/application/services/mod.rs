//! Application services.

mod cache_admin_service;
mod image_resolution_service;
mod path_resolver;

pub use cache_admin_service::CacheAdminService;
pub use image_resolution_service::ImageResolutionService;
pub use path_resolver::PathResolver;
