//! Error types for the pipeline module.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::converter::ConverterError;
use crate::discovery::DiscoveryError;
use crate::error::FailureKind;
use crate::metadata::MetadataError;
use crate::persist::PersistError;

/// Failures that abort the whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An option was out of range.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The initial listing failed; there is nothing to iterate.
    #[error("failed to list records: {0}")]
    Listing(#[source] MetadataError),

    /// The report directory cannot be created or written.
    #[error("report directory {path} is not usable: {source}")]
    ReportDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A discovery strategy could not be set up.
    #[error("failed to set up discovery: {0}")]
    Discovery(#[from] DiscoveryError),
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Configuration(_) => FailureKind::Configuration,
            Self::Listing(e) => e.kind(),
            Self::ReportDirectory { .. } => FailureKind::Filesystem,
            Self::Discovery(e) => e.kind(),
        }
    }
}

/// A failure confined to one record.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Convert(#[from] ConverterError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

impl ItemError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Discovery(e) => e.kind(),
            Self::Convert(e) => e.kind(),
            Self::Persist(e) => e.kind(),
            Self::Metadata(e) => e.kind(),
        }
    }
}
