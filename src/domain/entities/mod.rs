//! Domain entity definitions.

mod cache;
mod derivative;
mod image;
mod rewrite_table;

pub use cache::{CacheSnapshot, CacheStats};
pub use derivative::{DerivativeRequest, DerivativeResult, Fingerprint, ResizeMode, SizePreset};
pub use image::{ImageFormat, ImageRecord, OCTET_STREAM, ResolvedImage, content_type_for_path};
pub use rewrite_table::RewriteTable;
