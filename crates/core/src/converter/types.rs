//! Types for the converter module.

use serde::Serialize;

/// How the decoded pixels were brought into RGB before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorHandling {
    /// Already opaque RGB, encoded as is.
    Direct,
    /// Opaque but not RGB8 (grayscale, 16-bit, ...), plain format conversion.
    Converted,
    /// Had an alpha channel, composited onto white.
    FlattenedOnWhite,
}

/// Output of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// Encoded JPEG bytes.
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Quality the JPEG was encoded at.
    pub quality: u8,
    pub color: ColorHandling,
}

impl ConversionResult {
    /// Size of the encoded JPEG in bytes.
    pub fn size_bytes(&self) -> usize {
        self.jpeg.len()
    }
}
