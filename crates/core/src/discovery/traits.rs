//! Trait definitions for the discovery module.

use async_trait::async_trait;

use crate::metadata::Record;

use super::error::DiscoveryError;
use super::types::{AssetLocation, CandidateAsset, CandidateListing};

/// Locates screenshot assets and reads their bytes.
#[async_trait]
pub trait ContentDiscovery: Send + Sync {
    /// Returns the name of this discovery strategy.
    fn name(&self) -> &str;

    /// Enumerates every WebP asset reachable by this strategy.
    ///
    /// Per-asset failures end up in `diagnostics`; the call itself never fails.
    async fn list_candidates(&self, records: &[Record]) -> CandidateListing;

    /// Locates and classifies the screenshot of a single record.
    ///
    /// `Ok(None)` when this strategy cannot locate the reference at all. An
    /// asset that was located but could not be read is an error.
    async fn inspect(&self, record: &Record) -> Result<Option<CandidateAsset>, DiscoveryError>;

    /// Reads the full bytes of a located asset.
    async fn read(&self, location: &AssetLocation) -> Result<Vec<u8>, DiscoveryError>;
}
