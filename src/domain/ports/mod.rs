mod cache_inventory;
mod image_catalog_port;
mod transcoder_port;

pub use cache_inventory::CacheInventory;
pub use image_catalog_port::ImageCatalogPort;
pub use transcoder_port::TranscoderPort;
