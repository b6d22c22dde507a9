//! Image file storage, catalog and transcoding.

mod catalog;
mod store;
mod transcoder;

pub use catalog::{DirectoryCatalog, PREFERRED_EXTENSIONS};
pub use store::{ImageStore, ensure_relative};
pub use transcoder::{DEFAULT_QUALITY, ImageTranscoder, apply_sizing};

#[cfg(test)]
pub(crate) use transcoder::tests::sample_jpeg;
