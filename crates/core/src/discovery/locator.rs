//! Blob store root resolution.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::StoreConfig;

/// Name of the blob directory inside a data directory.
const BLOBS_DIR: &str = "blobs";

/// Resolves the blob store root.
///
/// Order: explicit `root` (exclusive, no fallback), then `db_path/blobs`,
/// then each fallback data directory's `blobs/`, first existing wins.
#[derive(Debug, Clone)]
pub struct StoreLocator {
    root: Option<PathBuf>,
    db_path: Option<PathBuf>,
    fallbacks: Vec<PathBuf>,
}

impl StoreLocator {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            root: config.root.clone(),
            db_path: config.db_path.clone(),
            fallbacks: config.fallbacks.clone(),
        }
    }

    /// A locator that only ever looks at `root`.
    pub fn fixed(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            db_path: None,
            fallbacks: Vec::new(),
        }
    }

    /// Every directory that would be probed, in order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        if let Some(root) = &self.root {
            return vec![root.clone()];
        }

        let mut candidates = Vec::new();
        if let Some(db_path) = &self.db_path {
            candidates.push(db_path.join(BLOBS_DIR));
        }
        candidates.extend(self.fallbacks.iter().map(|dir| dir.join(BLOBS_DIR)));
        candidates
    }

    /// First candidate that is an existing directory.
    pub fn resolve(&self) -> Option<PathBuf> {
        for candidate in self.candidates() {
            if candidate.is_dir() {
                info!("Using blob store at {}", candidate.display());
                return Some(candidate);
            }
            debug!("Checked {}: not a directory", candidate.display());
        }
        None
    }
}
