//! Wiring of discovery and persistence strategies.

use std::sync::Arc;

use crate::config::{Config, DiscoveryMode};
use crate::discovery::{ContentDiscovery, LocalStoreDiscovery, RemoteProbeDiscovery, StoreLocator};
use crate::metadata::MetadataClient;
use crate::persist::{EmbeddedPersister, PathPersister, ScreenshotPersister};

use super::error::PipelineError;

/// A discovery strategy and the persister that matches it.
pub struct Strategy {
    pub discovery: Arc<dyn ContentDiscovery>,
    pub persister: Arc<dyn ScreenshotPersister>,
}

impl Strategy {
    /// Builds the pair for the configured mode.
    ///
    /// Local store discovery always writes paths and remote probing always
    /// uploads inline; the two are never mixed.
    pub fn from_config(
        config: &Config,
        metadata: Arc<dyn MetadataClient>,
    ) -> Result<Self, PipelineError> {
        match config.discovery.mode {
            DiscoveryMode::LocalStore => Ok(Self {
                discovery: Arc::new(LocalStoreDiscovery::new(StoreLocator::new(&config.store))),
                persister: Arc::new(PathPersister::new(metadata)),
            }),
            DiscoveryMode::RemoteProbe => Ok(Self {
                discovery: Arc::new(RemoteProbeDiscovery::new(&config.remote)?),
                persister: Arc::new(EmbeddedPersister::new(metadata)),
            }),
        }
    }
}
