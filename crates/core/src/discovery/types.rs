//! Types for the discovery module.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::classifier::Classification;

/// Where an asset lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetLocation {
    /// A file in the local blob store.
    Local(PathBuf),
    /// An http(s) URL served by the media server.
    Remote(String),
}

impl AssetLocation {
    pub fn as_path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Local(path) => Some(path),
            Self::Remote(_) => None,
        }
    }
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

/// An asset together with its signature classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateAsset {
    pub location: AssetLocation,
    pub classification: Classification,
    /// Record the asset was found through, when discovery is record driven.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl CandidateAsset {
    pub fn new(location: AssetLocation, classification: Classification) -> Self {
        Self {
            location,
            classification,
            record_id: None,
        }
    }

    pub fn for_record(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }
}

/// Result of a full enumeration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidateListing {
    /// WebP assets only.
    pub candidates: Vec<CandidateAsset>,
    /// Number of assets examined.
    pub scanned: usize,
    /// Problems that did not stop the enumeration.
    pub diagnostics: Vec<String>,
}
