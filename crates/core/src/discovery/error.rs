//! Error types for the discovery module.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::FailureKind;

/// Errors raised while inspecting or reading a located asset.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Local file could not be read.
    #[error("cannot read {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Local file is shorter than a format signature.
    #[error("cannot classify {path}: only {len} bytes")]
    Truncated { path: PathBuf, len: usize },

    /// Request for a remote asset never completed.
    #[error("failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    /// Remote asset answered with a non-200 status.
    #[error("fetching {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Remote asset is served with a non-image content type.
    #[error("{url} is not an image (content type {content_type:?})")]
    NotAnImage { url: String, content_type: String },

    /// The location kind does not belong to this strategy.
    #[error("{strategy} discovery cannot read {location}")]
    WrongLocation { strategy: String, location: String },
}

impl DiscoveryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Filesystem { .. } | Self::Truncated { .. } => FailureKind::Filesystem,
            Self::Transport { .. } => FailureKind::Transport,
            Self::HttpStatus { .. } => FailureKind::Protocol,
            Self::NotAnImage { .. } => FailureKind::Decode,
            Self::WrongLocation { .. } => FailureKind::Configuration,
        }
    }
}
