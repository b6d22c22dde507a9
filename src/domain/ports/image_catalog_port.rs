//! Backing record store port.

use async_trait::async_trait;

use crate::domain::entities::ImageRecord;
use crate::domain::errors::ImageError;

/// Port for looking up image metadata records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageCatalogPort: Send + Sync {
    /// Finds the record for `name` (file stem) inside `folder`.
    async fn find(&self, folder: &str, name: &str) -> Result<Option<ImageRecord>, ImageError>;
}
