//! Application layer with services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Image resolution and cache administration services.
pub mod services;

pub use dto::{ClearReport, ClearedCache, ServedImage};
pub use services::{CacheAdminService, ImageResolutionService, PathResolver};
