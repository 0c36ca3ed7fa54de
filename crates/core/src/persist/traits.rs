//! Trait definitions for the persist module.

use async_trait::async_trait;

use crate::discovery::AssetLocation;
use crate::metadata::Record;

use super::error::PersistError;

/// Stores a converted screenshot and points the record at it.
#[async_trait]
pub trait ScreenshotPersister: Send + Sync {
    /// Returns the name of this persister implementation.
    fn name(&self) -> &str;

    /// Reference the record would carry after a successful persist.
    fn planned_ref(&self, location: &AssetLocation) -> Result<String, PersistError>;

    /// Whether a converted asset for `location` already exists.
    async fn target_exists(&self, location: &AssetLocation) -> bool;

    /// Stores `jpeg` and updates the record. Returns the new reference.
    async fn persist(
        &self,
        record: &Record,
        location: &AssetLocation,
        jpeg: &[u8],
    ) -> Result<String, PersistError>;

    /// Removes the source asset after a successful persist.
    async fn remove_original(&self, location: &AssetLocation) -> Result<(), PersistError>;
}
