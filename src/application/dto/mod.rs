//! Data transfer objects for the application layer.

mod cache_dto;
mod image_dto;

pub use cache_dto::{ClearReport, ClearedCache};
pub use image_dto::ServedImage;
