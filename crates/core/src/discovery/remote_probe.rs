//! Remote URL probing discovery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::classifier::{classify_bytes, Classification};
use crate::config::RemoteConfig;
use crate::metadata::{is_url, Record};

use super::error::DiscoveryError;
use super::traits::ContentDiscovery;
use super::types::{AssetLocation, CandidateAsset, CandidateListing};

const API_KEY_HEADER: &str = "ApiKey";

/// Discovery that downloads each screenshot URL and classifies the body.
///
/// The body of the last WebP probe is kept so that the conversion step right
/// after it does not download the same asset twice.
pub struct RemoteProbeDiscovery {
    client: Client,
    api_key: String,
    last_fetch: Mutex<Option<(String, Vec<u8>)>>,
}

impl RemoteProbeDiscovery {
    pub fn new(config: &RemoteConfig) -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| DiscoveryError::Transport {
                url: config.url.clone(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            last_fetch: Mutex::new(None),
        })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DiscoveryError> {
        let mut request = self.client.get(url);
        if !self.api_key.is_empty() {
            request = request.header(API_KEY_HEADER, &self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DiscoveryError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(DiscoveryError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(DiscoveryError::NotAnImage {
                url: url.to_string(),
                content_type,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DiscoveryError::Transport {
                url: url.to_string(),
                reason: format!("failed to read body: {}", e),
            })?;
        Ok(bytes.to_vec())
    }

    /// Fetches and classifies one URL. Only transport failures are errors;
    /// error statuses and non-image responses simply are not candidates.
    async fn probe(&self, url: &str) -> Result<Classification, DiscoveryError> {
        match self.fetch(url).await {
            Ok(bytes) => {
                let classification = classify_bytes(&bytes);
                if classification.is_webp() {
                    debug!("Found WebP at {}", url);
                    *self.last_fetch.lock().await = Some((url.to_string(), bytes));
                }
                Ok(classification)
            }
            Err(e @ DiscoveryError::Transport { .. }) => Err(e),
            Err(e) => {
                debug!("Not a candidate: {}", e);
                Ok(Classification::NotAnImage)
            }
        }
    }
}

#[async_trait]
impl ContentDiscovery for RemoteProbeDiscovery {
    fn name(&self) -> &str {
        "remote_probe"
    }

    async fn list_candidates(&self, records: &[Record]) -> CandidateListing {
        let mut listing = CandidateListing::default();

        for record in records {
            let Some(url) = record.screenshot().filter(|r| is_url(r)) else {
                continue;
            };
            listing.scanned += 1;

            match self.probe(url).await {
                Ok(Classification::WebP) => listing.candidates.push(
                    CandidateAsset::new(AssetLocation::Remote(url.to_string()), Classification::WebP)
                        .for_record(&record.id),
                ),
                Ok(_) => {}
                Err(e) => {
                    warn!("{}", e);
                    listing.diagnostics.push(format!("record {}: {}", record.id, e));
                }
            }
        }

        info!(
            "Probed {} screenshot URLs, {} WebP",
            listing.scanned,
            listing.candidates.len()
        );
        listing
    }

    async fn inspect(&self, record: &Record) -> Result<Option<CandidateAsset>, DiscoveryError> {
        let Some(reference) = record.screenshot() else {
            return Ok(None);
        };
        if !is_url(reference) {
            debug!("Record {}: {:?} is not a URL", record.id, reference);
            return Ok(None);
        }

        let classification = self.probe(reference).await?;
        Ok(Some(
            CandidateAsset::new(AssetLocation::Remote(reference.to_string()), classification)
                .for_record(&record.id),
        ))
    }

    async fn read(&self, location: &AssetLocation) -> Result<Vec<u8>, DiscoveryError> {
        let url = match location {
            AssetLocation::Remote(url) => url,
            AssetLocation::Local(path) => {
                return Err(DiscoveryError::WrongLocation {
                    strategy: self.name().to_string(),
                    location: path.display().to_string(),
                })
            }
        };

        {
            let mut cached = self.last_fetch.lock().await;
            if cached.as_ref().is_some_and(|(cached_url, _)| cached_url == url) {
                if let Some((_, bytes)) = cached.take() {
                    return Ok(bytes);
                }
            }
        }

        self.fetch(url).await
    }
}
