//! Failure categories shared across components.

use serde::Serialize;

/// Coarse failure category, independent of the component that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request never completed.
    Transport,
    /// The remote store answered with an application-level error.
    Protocol,
    /// The remote store answered with an unexpected shape.
    Validation,
    /// Bytes could not be decoded or re-encoded as an image.
    Decode,
    /// A path was missing or not accessible.
    Filesystem,
    /// An option was out of range.
    Configuration,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Protocol => "protocol",
            Self::Validation => "validation",
            Self::Decode => "decode",
            Self::Filesystem => "filesystem",
            Self::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
