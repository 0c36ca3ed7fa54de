//! Mock metadata client for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::metadata::{jpeg_data_uri, MetadataClient, MetadataError, Record};

/// Mock implementation of the MetadataClient trait.
///
/// Provides controllable behavior for testing:
/// - Scripted record listing
/// - Recorded path and embedded updates
/// - Injected failures, once or per record id
///
/// Path updates are applied to the scripted records, so a second listing
/// reflects them.
#[derive(Debug, Clone, Default)]
pub struct MockMetadataClient {
    records: Arc<RwLock<Vec<Record>>>,
    /// If set, listing fails with this error.
    listing_error: Arc<RwLock<Option<MetadataError>>>,
    /// If set, the next mutation fails with this error.
    next_error: Arc<RwLock<Option<MetadataError>>>,
    /// Mutations for these ids always fail.
    failing_ids: Arc<RwLock<HashSet<String>>>,
    path_updates: Arc<RwLock<Vec<(String, String)>>>,
    embedded_updates: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockMetadataClient {
    /// Create a new mock with no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock serving `records`.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            ..Default::default()
        }
    }

    /// Replace the scripted records.
    pub async fn set_records(&self, records: Vec<Record>) {
        *self.records.write().await = records;
    }

    /// Current state of the scripted records.
    pub async fn records(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }

    /// Current state of one record.
    pub async fn record(&self, id: &str) -> Option<Record> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Make the listing call fail.
    pub async fn fail_listing(&self, error: MetadataError) {
        *self.listing_error.write().await = Some(error);
    }

    /// Configure the next mutation to fail with the given error.
    pub async fn set_next_error(&self, error: MetadataError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every mutation for `id` fail.
    pub async fn fail_record(&self, id: impl Into<String>) {
        self.failing_ids.write().await.insert(id.into());
    }

    /// All `(id, path)` pairs sent through `set_screenshot_path`.
    pub async fn path_updates(&self) -> Vec<(String, String)> {
        self.path_updates.read().await.clone()
    }

    /// All `(id, data_uri)` pairs sent through `set_embedded_screenshot`.
    pub async fn embedded_updates(&self) -> Vec<(String, String)> {
        self.embedded_updates.read().await.clone()
    }

    /// Total number of mutations received.
    pub async fn mutation_count(&self) -> usize {
        self.path_updates.read().await.len() + self.embedded_updates.read().await.len()
    }

    async fn check_mutation(&self, id: &str) -> Result<(), MetadataError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if self.failing_ids.read().await.contains(id) {
            return Err(MetadataError::Protocol(format!("scene {} is locked", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataClient for MockMetadataClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_all_records(&self) -> Result<Vec<Record>, MetadataError> {
        if let Some(err) = self.listing_error.write().await.take() {
            return Err(err);
        }
        Ok(self.records.read().await.clone())
    }

    async fn set_screenshot_path(&self, id: &str, path: &str) -> Result<(), MetadataError> {
        self.check_mutation(id).await?;

        self.path_updates
            .write()
            .await
            .push((id.to_string(), path.to_string()));

        if let Some(record) = self.records.write().await.iter_mut().find(|r| r.id == id) {
            record.screenshot_ref = Some(path.to_string());
        }
        Ok(())
    }

    async fn set_embedded_screenshot(&self, id: &str, jpeg: &[u8]) -> Result<(), MetadataError> {
        self.check_mutation(id).await?;

        self.embedded_updates
            .write()
            .await
            .push((id.to_string(), jpeg_data_uri(jpeg)));
        Ok(())
    }
}
