//! Local blob store discovery.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::classifier::{classify_bytes, read_signature, Classification};
use crate::metadata::{is_url, Record};

use super::error::DiscoveryError;
use super::locator::StoreLocator;
use super::traits::ContentDiscovery;
use super::types::{AssetLocation, CandidateAsset, CandidateListing};

/// Discovery over the local content-addressed blob store.
///
/// The store is walked once, on first use, to build a file-name index used to
/// resolve references that are not direct paths.
pub struct LocalStoreDiscovery {
    locator: StoreLocator,
    index: OnceCell<StoreIndex>,
}

impl LocalStoreDiscovery {
    pub fn new(locator: StoreLocator) -> Self {
        Self {
            locator,
            index: OnceCell::new(),
        }
    }

    async fn index(&self) -> &StoreIndex {
        self.index
            .get_or_init(|| async {
                let locator = self.locator.clone();
                tokio::task::spawn_blocking(move || StoreIndex::build(&locator))
                    .await
                    .unwrap_or_else(|e| StoreIndex::failed(format!("store walk failed: {}", e)))
            })
            .await
    }

    /// Resolves a screenshot reference to a file in the store.
    ///
    /// Absolute paths are taken as is, relative ones are tried below the
    /// store root, then the reference's file name and stem are looked up in
    /// the index.
    pub async fn resolve(&self, reference: &str) -> Option<PathBuf> {
        if is_url(reference) {
            return None;
        }

        let path = Path::new(reference);
        if path.is_absolute() && is_file(path).await {
            return Some(path.to_path_buf());
        }

        let index = self.index().await;
        if let Some(root) = &index.root {
            let joined = root.join(path);
            if !path.is_absolute() && is_file(&joined).await {
                return Some(joined);
            }
        }

        let by_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| index.by_name.get(n));
        let by_stem = || {
            path.file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| index.by_stem.get(s))
        };

        let matches = by_name.or_else(by_stem)?;
        if matches.len() > 1 {
            debug!(
                "{} store files match {}, using {}",
                matches.len(),
                reference,
                matches[0].display()
            );
        }
        matches.first().cloned()
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Classifies a located file, surfacing read failures instead of hiding them.
async fn classify_located(path: &Path) -> Result<Classification, DiscoveryError> {
    let header = read_signature(path)
        .await
        .map_err(|source| DiscoveryError::Filesystem {
            path: path.to_path_buf(),
            source,
        })?;

    match classify_bytes(&header) {
        Classification::Unreadable => Err(DiscoveryError::Truncated {
            path: path.to_path_buf(),
            len: header.len(),
        }),
        classification => Ok(classification),
    }
}

#[async_trait]
impl ContentDiscovery for LocalStoreDiscovery {
    fn name(&self) -> &str {
        "local_store"
    }

    async fn list_candidates(&self, _records: &[Record]) -> CandidateListing {
        let index = self.index().await;
        let mut listing = CandidateListing {
            diagnostics: index.diagnostics.clone(),
            ..Default::default()
        };

        if index.root.is_none() {
            return listing;
        }

        for file in &index.files {
            listing.scanned += 1;
            match classify_located(file).await {
                Ok(Classification::WebP) => {
                    debug!("Found WebP blob: {}", file.display());
                    listing.candidates.push(CandidateAsset::new(
                        AssetLocation::Local(file.clone()),
                        Classification::WebP,
                    ));
                }
                Ok(_) => {}
                Err(e) => listing.diagnostics.push(e.to_string()),
            }
        }

        info!(
            "Scanned {} store files, {} WebP",
            listing.scanned,
            listing.candidates.len()
        );
        listing
    }

    async fn inspect(&self, record: &Record) -> Result<Option<CandidateAsset>, DiscoveryError> {
        let Some(reference) = record.screenshot() else {
            return Ok(None);
        };

        let Some(path) = self.resolve(reference).await else {
            debug!("Record {}: {} not found in store", record.id, reference);
            return Ok(None);
        };

        let classification = classify_located(&path).await?;
        Ok(Some(
            CandidateAsset::new(AssetLocation::Local(path), classification).for_record(&record.id),
        ))
    }

    async fn read(&self, location: &AssetLocation) -> Result<Vec<u8>, DiscoveryError> {
        match location {
            AssetLocation::Local(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| DiscoveryError::Filesystem {
                        path: path.clone(),
                        source,
                    })
            }
            AssetLocation::Remote(url) => Err(DiscoveryError::WrongLocation {
                strategy: self.name().to_string(),
                location: url.clone(),
            }),
        }
    }
}

/// Snapshot of the store taken at first use.
#[derive(Debug, Default)]
struct StoreIndex {
    root: Option<PathBuf>,
    files: Vec<PathBuf>,
    by_name: HashMap<String, Vec<PathBuf>>,
    by_stem: HashMap<String, Vec<PathBuf>>,
    diagnostics: Vec<String>,
}

impl StoreIndex {
    fn failed(diagnostic: String) -> Self {
        warn!("{}", diagnostic);
        Self {
            diagnostics: vec![diagnostic],
            ..Default::default()
        }
    }

    fn build(locator: &StoreLocator) -> Self {
        let Some(root) = locator.resolve() else {
            let checked: Vec<String> = locator
                .candidates()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            return Self::failed(format!(
                "no blob store found, checked: {}",
                checked.join(", ")
            ));
        };

        let mut index = Self {
            root: Some(root.clone()),
            ..Default::default()
        };

        for entry in WalkDir::new(&root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    index.diagnostics.push(format!("walk error: {}", e));
                    continue;
                }
            };
            if entry.file_type().is_file() {
                index.files.push(entry.into_path());
            }
        }

        // Sort for deterministic resolution and listing order
        index.files.sort();

        for file in &index.files {
            if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
                index
                    .by_name
                    .entry(name.to_string())
                    .or_default()
                    .push(file.clone());
            }
            if let Some(stem) = file.file_stem().and_then(|s| s.to_str()) {
                index
                    .by_stem
                    .entry(stem.to_string())
                    .or_default()
                    .push(file.clone());
            }
        }

        debug!("Indexed {} files under {}", index.files.len(), root.display());
        index
    }
}
