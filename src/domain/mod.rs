//! Domain layer with image entities, the error taxonomy and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{
    CacheSnapshot, CacheStats, DerivativeRequest, DerivativeResult, Fingerprint, ImageFormat,
    ImageRecord, ResizeMode, ResolvedImage, RewriteTable, SizePreset,
};
pub use errors::ImageError;
pub use ports::{CacheInventory, ImageCatalogPort, TranscoderPort};
