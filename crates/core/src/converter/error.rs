//! Error types for the converter module.

use thiserror::Error;

use crate::error::FailureKind;

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Input bytes are not an image the decoder understands.
    #[error("failed to decode image: {reason}")]
    Decode { reason: String },

    /// The JPEG encoder rejected the image.
    #[error("failed to encode JPEG: {reason}")]
    Encode { reason: String },

    /// Quality outside 1..=100.
    #[error("invalid JPEG quality {quality}, expected 1-100")]
    InvalidQuality { quality: u8 },

    /// The blocking conversion task panicked or was cancelled.
    #[error("conversion task failed: {reason}")]
    TaskFailed { reason: String },
}

impl ConverterError {
    /// Creates a new decode error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Creates a new encode error.
    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidQuality { .. } => FailureKind::Configuration,
            Self::Decode { .. } | Self::Encode { .. } | Self::TaskFailed { .. } => {
                FailureKind::Decode
            }
        }
    }
}
