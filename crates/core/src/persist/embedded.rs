//! Embedded-image persister for remote deployments.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::discovery::AssetLocation;
use crate::metadata::{MetadataClient, Record};

use super::error::PersistError;
use super::traits::ScreenshotPersister;

/// Uploads the JPEG inline; the server stores it and keeps serving it from
/// the same screenshot URL.
pub struct EmbeddedPersister {
    metadata: Arc<dyn MetadataClient>,
}

impl EmbeddedPersister {
    pub fn new(metadata: Arc<dyn MetadataClient>) -> Self {
        Self { metadata }
    }
}

#[async_trait]
impl ScreenshotPersister for EmbeddedPersister {
    fn name(&self) -> &str {
        "embedded"
    }

    fn planned_ref(&self, location: &AssetLocation) -> Result<String, PersistError> {
        Ok(location.to_string())
    }

    // There is no separate target to find; every probe starts fresh.
    async fn target_exists(&self, _location: &AssetLocation) -> bool {
        false
    }

    async fn persist(
        &self,
        record: &Record,
        location: &AssetLocation,
        jpeg: &[u8],
    ) -> Result<String, PersistError> {
        self.metadata.set_embedded_screenshot(&record.id, jpeg).await?;
        debug!("Uploaded {} byte JPEG for record {}", jpeg.len(), record.id);
        Ok(location.to_string())
    }

    async fn remove_original(&self, location: &AssetLocation) -> Result<(), PersistError> {
        debug!("Nothing to remove for {}, the server replaced it", location);
        Ok(())
    }
}
