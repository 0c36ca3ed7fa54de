//! Error types for the persist module.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::FailureKind;
use crate::metadata::MetadataError;

/// Errors that can occur while storing a converted screenshot.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The metadata store rejected or never received the update.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Writing the JPEG or removing the original failed.
    #[error("{action} {path}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The location kind does not belong to this strategy.
    #[error("{strategy} persister cannot handle {location}")]
    Unsupported { strategy: String, location: String },
}

impl PersistError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Metadata(e) => e.kind(),
            Self::Filesystem { .. } => FailureKind::Filesystem,
            Self::Unsupported { .. } => FailureKind::Configuration,
        }
    }
}
