//! Path-rewriting persister for the local blob store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::discovery::AssetLocation;
use crate::metadata::{MetadataClient, Record};

use super::error::PersistError;
use super::traits::ScreenshotPersister;

/// Target path of the JPEG converted from `source`.
///
/// Same directory, `.jpg` extension. A source that already ends in `.jpg`
/// (a WebP in disguise) gets a `.converted.jpg` suffix so the two never
/// collide.
pub fn jpeg_target(source: &Path) -> PathBuf {
    let target = source.with_extension("jpg");
    if target != source {
        return target;
    }
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{}.converted.jpg", stem))
}

/// Writes the JPEG beside the source and points the record at it.
pub struct PathPersister {
    metadata: Arc<dyn MetadataClient>,
}

impl PathPersister {
    pub fn new(metadata: Arc<dyn MetadataClient>) -> Self {
        Self { metadata }
    }

    fn local_path<'a>(&self, location: &'a AssetLocation) -> Result<&'a Path, PersistError> {
        location.as_path().ok_or_else(|| PersistError::Unsupported {
            strategy: self.name().to_string(),
            location: location.to_string(),
        })
    }
}

#[async_trait]
impl ScreenshotPersister for PathPersister {
    fn name(&self) -> &str {
        "path"
    }

    fn planned_ref(&self, location: &AssetLocation) -> Result<String, PersistError> {
        let source = self.local_path(location)?;
        Ok(jpeg_target(source).to_string_lossy().into_owned())
    }

    async fn target_exists(&self, location: &AssetLocation) -> bool {
        match location.as_path() {
            Some(source) => tokio::fs::try_exists(jpeg_target(source))
                .await
                .unwrap_or(false),
            None => false,
        }
    }

    async fn persist(
        &self,
        record: &Record,
        location: &AssetLocation,
        jpeg: &[u8],
    ) -> Result<String, PersistError> {
        let target = jpeg_target(self.local_path(location)?);

        tokio::fs::write(&target, jpeg)
            .await
            .map_err(|source| PersistError::Filesystem {
                action: "cannot write",
                path: target.clone(),
                source,
            })?;
        debug!("Wrote {} bytes to {}", jpeg.len(), target.display());

        let new_ref = target.to_string_lossy().into_owned();
        self.metadata.set_screenshot_path(&record.id, &new_ref).await?;
        Ok(new_ref)
    }

    async fn remove_original(&self, location: &AssetLocation) -> Result<(), PersistError> {
        let source = self.local_path(location)?;
        tokio::fs::remove_file(source)
            .await
            .map_err(|e| PersistError::Filesystem {
                action: "cannot remove",
                path: source.to_path_buf(),
                source: e,
            })?;
        debug!("Removed original {}", source.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataError;
    use crate::testing::MockMetadataClient;
    use tempfile::TempDir;

    #[test]
    fn test_jpeg_target() {
        assert_eq!(jpeg_target(Path::new("/s/x.webp")), PathBuf::from("/s/x.jpg"));
        assert_eq!(jpeg_target(Path::new("/s/ab12ef")), PathBuf::from("/s/ab12ef.jpg"));
        assert_eq!(
            jpeg_target(Path::new("/s/cover.jpg")),
            PathBuf::from("/s/cover.converted.jpg")
        );
    }

    #[tokio::test]
    async fn test_persist_writes_and_repoints() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("x.webp");
        std::fs::write(&source, b"webp").unwrap();

        let metadata = Arc::new(MockMetadataClient::new());
        let persister = PathPersister::new(metadata.clone());
        let location = AssetLocation::Local(source.clone());

        assert!(!persister.target_exists(&location).await);

        let record = Record::new("1", "Scene").with_screenshot("x.webp");
        let new_ref = persister.persist(&record, &location, b"jpeg").await.unwrap();

        let target = temp.path().join("x.jpg");
        assert_eq!(new_ref, target.to_string_lossy());
        assert_eq!(std::fs::read(&target).unwrap(), b"jpeg");
        assert!(source.exists());
        assert!(persister.target_exists(&location).await);

        let updates = metadata.path_updates().await;
        assert_eq!(updates, vec![("1".to_string(), new_ref)]);
    }

    #[tokio::test]
    async fn test_metadata_failure_leaves_written_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("x.webp");

        let metadata = Arc::new(MockMetadataClient::new());
        metadata
            .set_next_error(MetadataError::Transport("connection refused".into()))
            .await;
        let persister = PathPersister::new(metadata);

        let record = Record::new("1", "Scene");
        let result = persister
            .persist(&record, &AssetLocation::Local(source), b"jpeg")
            .await;

        assert!(matches!(result, Err(PersistError::Metadata(_))));
        assert!(temp.path().join("x.jpg").exists());
    }

    #[tokio::test]
    async fn test_remove_original() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("x.webp");
        std::fs::write(&source, b"webp").unwrap();

        let persister = PathPersister::new(Arc::new(MockMetadataClient::new()));
        let location = AssetLocation::Local(source.clone());

        persister.remove_original(&location).await.unwrap();
        assert!(!source.exists());

        let again = persister.remove_original(&location).await;
        assert!(matches!(again, Err(PersistError::Filesystem { .. })));
    }

    #[tokio::test]
    async fn test_remote_location_unsupported() {
        let persister = PathPersister::new(Arc::new(MockMetadataClient::new()));
        let location = AssetLocation::Remote("http://stash/scene/1/screenshot".into());

        assert!(persister.planned_ref(&location).is_err());
        let result = persister
            .persist(&Record::new("1", ""), &location, b"jpeg")
            .await;
        assert!(matches!(result, Err(PersistError::Unsupported { .. })));
    }
}
