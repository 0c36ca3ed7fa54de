//! Content discovery: finding screenshot assets and deciding their format.
//!
//! Two strategies exist and are not interchangeable in what they find:
//!
//! - [`LocalStoreDiscovery`] walks the content-addressed blob store on disk.
//!   Blobs have no extension, so every file is classified by signature.
//! - [`RemoteProbeDiscovery`] fetches each record's screenshot URL and
//!   classifies the response body in memory.

mod error;
mod local_store;
mod locator;
mod remote_probe;
mod traits;
mod types;

pub use error::DiscoveryError;
pub use local_store::LocalStoreDiscovery;
pub use locator::StoreLocator;
pub use remote_probe::RemoteProbeDiscovery;
pub use traits::ContentDiscovery;
pub use types::{AssetLocation, CandidateAsset, CandidateListing};
