//! Facade over the remote metadata store.
//!
//! The store speaks GraphQL over HTTP POST. Only three operations are needed:
//! list every record, repoint a record's screenshot at a path, and replace a
//! record's screenshot with inline image data.

mod graphql;
mod types;

pub use graphql::GraphqlMetadataClient;
pub use types::{is_url, Record};

use async_trait::async_trait;
use thiserror::Error;

use crate::error::FailureKind;

/// Errors returned by metadata clients.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The request never completed (connection refused, timeout, ...).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with an application-level error.
    #[error("protocol failure: {0}")]
    Protocol(String),

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    Validation(String),
}

impl MetadataError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::Protocol(_) => FailureKind::Protocol,
            Self::Validation(_) => FailureKind::Validation,
        }
    }
}

/// Client for the remote metadata store.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Returns the name of this client implementation.
    fn name(&self) -> &str;

    /// Fetches every record in one logical call.
    ///
    /// Implementations must fail rather than return a partial listing.
    async fn list_all_records(&self) -> Result<Vec<Record>, MetadataError>;

    /// Points a record's screenshot at `path`. Idempotent.
    async fn set_screenshot_path(&self, id: &str, path: &str) -> Result<(), MetadataError>;

    /// Replaces a record's screenshot with inline JPEG data.
    async fn set_embedded_screenshot(&self, id: &str, jpeg: &[u8]) -> Result<(), MetadataError>;
}

/// Encodes JPEG bytes as a `data:` URI.
pub fn jpeg_data_uri(jpeg: &[u8]) -> String {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;

    format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg))
}
