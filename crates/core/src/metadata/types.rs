//! Types shared by metadata clients.

use serde::{Deserialize, Serialize};

/// A media record as held by the remote metadata store.
///
/// The pipeline only ever rewrites `screenshot_ref`; everything else is
/// read-only context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// Opaque, stable identifier.
    pub id: String,
    /// Display title (may be empty).
    #[serde(default)]
    pub title: String,
    /// Local path or URL of the current screenshot, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_ref: Option<String>,
    /// Other image assets associated with the record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_refs: Vec<String>,
}

impl Record {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            screenshot_ref: None,
            image_refs: Vec::new(),
        }
    }

    pub fn with_screenshot(mut self, reference: impl Into<String>) -> Self {
        self.screenshot_ref = Some(reference.into());
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.image_refs = images;
        self
    }

    /// Screenshot reference, treating blank strings as absent.
    pub fn screenshot(&self) -> Option<&str> {
        self.screenshot_ref
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Title for log lines, falling back to a placeholder.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Unknown"
        } else {
            &self.title
        }
    }
}

/// Returns true when a reference looks like an http(s) URL.
pub fn is_url(reference: &str) -> bool {
    let lower = reference.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
