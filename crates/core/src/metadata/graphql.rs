//! GraphQL metadata client.
//!
//! Talks to the media server's `/graphql` endpoint. Scenes are the records;
//! `paths.screenshot` is the screenshot reference.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::RemoteConfig;

use super::{jpeg_data_uri, MetadataClient, MetadataError, Record};

const FIND_ALL_SCENES: &str = r#"
query FindAllScenes {
  findScenes(filter: { per_page: -1 }) {
    count
    scenes {
      id
      title
      paths {
        screenshot
      }
    }
  }
}
"#;

const UPDATE_SCENE: &str = r#"
mutation UpdateScene($input: SceneUpdateInput!) {
  sceneUpdate(input: $input) {
    id
  }
}
"#;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "ApiKey";

/// Metadata client backed by a GraphQL endpoint.
pub struct GraphqlMetadataClient {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout_secs: u32,
}

impl GraphqlMetadataClient {
    /// Create a new client.
    pub fn new(config: &RemoteConfig) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| MetadataError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// The endpoint requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<T, MetadataError> {
        let mut payload = json!({ "query": query });
        if let Some(vars) = variables {
            payload["variables"] = vars;
        }

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if !self.api_key.is_empty() {
            request = request.header(API_KEY_HEADER, &self.api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MetadataError::Transport(format!(
                    "request to {} timed out after {}s",
                    self.endpoint, self.timeout_secs
                ))
            } else {
                MetadataError::Transport(format!("request to {} failed: {}", self.endpoint, e))
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            MetadataError::Transport(format!("failed to read response body: {}", e))
        })?;

        decode_response(status, &body)
    }
}

#[async_trait]
impl MetadataClient for GraphqlMetadataClient {
    fn name(&self) -> &str {
        "graphql"
    }

    async fn list_all_records(&self) -> Result<Vec<Record>, MetadataError> {
        debug!("Listing all scenes from {}", self.endpoint);

        let data: FindScenesData = self.execute(FIND_ALL_SCENES, None).await?;
        let listing = data.find_scenes;

        if listing.count as usize != listing.scenes.len() {
            return Err(MetadataError::Validation(format!(
                "listing reported {} scenes but returned {}",
                listing.count,
                listing.scenes.len()
            )));
        }

        Ok(listing.scenes.into_iter().map(Record::from).collect())
    }

    async fn set_screenshot_path(&self, id: &str, path: &str) -> Result<(), MetadataError> {
        debug!("Setting screenshot path of scene {} to {}", id, path);

        let variables = json!({
            "input": {
                "id": id,
                "paths": { "screenshot": path }
            }
        });
        let data: UpdateSceneData = self.execute(UPDATE_SCENE, Some(variables)).await?;
        data.ensure_updated(id)
    }

    async fn set_embedded_screenshot(&self, id: &str, jpeg: &[u8]) -> Result<(), MetadataError> {
        debug!("Uploading {} byte cover image for scene {}", jpeg.len(), id);

        let variables = json!({
            "input": {
                "id": id,
                "cover_image": jpeg_data_uri(jpeg)
            }
        });
        let data: UpdateSceneData = self.execute(UPDATE_SCENE, Some(variables)).await?;
        data.ensure_updated(id)
    }
}

/// Turns a raw HTTP response into typed GraphQL data.
///
/// An `errors` array always wins over the status code.
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, MetadataError> {
    let parsed: GraphqlResponse<T> = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            if !status.is_success() {
                return Err(MetadataError::Protocol(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    snippet(body)
                )));
            }
            return Err(MetadataError::Validation(format!(
                "failed to parse response: {}",
                e
            )));
        }
    };

    if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(MetadataError::Protocol(messages.join("; ")));
    }

    if !status.is_success() {
        return Err(MetadataError::Protocol(format!(
            "HTTP {}: {}",
            status.as_u16(),
            snippet(body)
        )));
    }

    parsed
        .data
        .ok_or_else(|| MetadataError::Validation("response carried no data".to_string()))
}

fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

// ============================================================================
// Wire types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct FindScenesData {
    #[serde(rename = "findScenes")]
    find_scenes: FindScenes,
}

#[derive(Debug, Deserialize)]
struct FindScenes {
    count: u64,
    #[serde(default)]
    scenes: Vec<SceneWire>,
}

#[derive(Debug, Deserialize)]
struct SceneWire {
    id: String,
    title: Option<String>,
    paths: Option<ScenePaths>,
}

#[derive(Debug, Deserialize)]
struct ScenePaths {
    screenshot: Option<String>,
    /// Only reported by backends that track several images per scene.
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateSceneData {
    #[serde(rename = "sceneUpdate")]
    scene_update: Option<UpdatedScene>,
}

#[derive(Debug, Deserialize)]
struct UpdatedScene {
    #[allow(dead_code)]
    id: String,
}

impl UpdateSceneData {
    fn ensure_updated(self, id: &str) -> Result<(), MetadataError> {
        match self.scene_update {
            Some(_) => Ok(()),
            None => Err(MetadataError::Protocol(format!(
                "sceneUpdate returned null for scene {}",
                id
            ))),
        }
    }
}

impl From<SceneWire> for Record {
    fn from(scene: SceneWire) -> Self {
        let (screenshot_ref, image_refs) = match scene.paths {
            Some(paths) => (paths.screenshot, paths.images),
            None => (None, Vec::new()),
        };
        Self {
            id: scene.id,
            title: scene.title.unwrap_or_default(),
            screenshot_ref,
            image_refs,
        }
    }
}
