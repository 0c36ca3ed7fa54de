//! Signature-based asset classification.
//!
//! Store blobs carry no extension and remote servers may lie about content
//! types, so the format is decided from the leading bytes only.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;

/// Number of leading bytes needed to recognise a WebP container.
pub const SIGNATURE_LEN: usize = 12;

const RIFF_TAG: &[u8; 4] = b"RIFF";
const WEBP_TAG: &[u8; 4] = b"WEBP";

/// Format of an asset as derived from its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// RIFF container with a WEBP form type.
    #[serde(rename = "webp")]
    WebP,
    /// Some other image format the decoder recognises.
    OtherImage,
    /// Readable, but not an image.
    NotAnImage,
    /// Could not be read far enough to decide.
    Unreadable,
}

impl Classification {
    pub fn is_webp(&self) -> bool {
        matches!(self, Self::WebP)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::OtherImage => "other_image",
            Self::NotAnImage => "not_an_image",
            Self::Unreadable => "unreadable",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true when `header` starts with a RIFF/WEBP container signature.
pub fn is_webp_signature(header: &[u8]) -> bool {
    header.len() >= SIGNATURE_LEN && &header[0..4] == RIFF_TAG && &header[8..12] == WEBP_TAG
}

/// Classifies the leading bytes of an asset.
///
/// Inputs shorter than [`SIGNATURE_LEN`] are treated as truncated reads.
pub fn classify_bytes(header: &[u8]) -> Classification {
    if header.len() < SIGNATURE_LEN {
        return Classification::Unreadable;
    }
    if is_webp_signature(header) {
        return Classification::WebP;
    }
    match image::guess_format(header) {
        Ok(_) => Classification::OtherImage,
        Err(_) => Classification::NotAnImage,
    }
}

/// Reads up to [`SIGNATURE_LEN`] leading bytes of a file.
///
/// A short result means the file itself is shorter than a signature.
pub async fn read_signature(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut header = Vec::with_capacity(SIGNATURE_LEN);
    file.take(SIGNATURE_LEN as u64)
        .read_to_end(&mut header)
        .await?;
    Ok(header)
}

/// Reads the signature of a file and classifies it.
///
/// Never fails: permission problems, missing files and truncated files all
/// come back as [`Classification::Unreadable`].
pub async fn classify_file(path: &Path) -> Classification {
    match read_signature(path).await {
        Ok(header) => classify_bytes(&header),
        Err(e) => {
            tracing::debug!("Cannot read signature of {}: {}", path.display(), e);
            Classification::Unreadable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn webp_header() -> Vec<u8> {
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&[0x24, 0, 0, 0]);
        bytes.extend_from_slice(b"WEBPVP8 ");
        bytes
    }

    #[test]
    fn test_webp_signature_detected() {
        assert_eq!(classify_bytes(&webp_header()), Classification::WebP);
    }

    #[test]
    fn test_riff_without_webp_is_not_webp() {
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&[0x24, 0, 0, 0]);
        bytes.extend_from_slice(b"WAVEfmt ");
        assert_ne!(classify_bytes(&bytes), Classification::WebP);
    }

    #[test]
    fn test_webp_tag_without_riff_is_not_webp() {
        let mut bytes = b"RIFX".to_vec();
        bytes.extend_from_slice(&[0x24, 0, 0, 0]);
        bytes.extend_from_slice(b"WEBPVP8 ");
        assert_ne!(classify_bytes(&bytes), Classification::WebP);
    }

    #[test]
    fn test_mutating_any_tag_byte_breaks_webp() {
        let original = webp_header();
        for idx in (0..4).chain(8..12) {
            let mut bytes = original.clone();
            bytes[idx] ^= 0x20;
            assert_ne!(
                classify_bytes(&bytes),
                Classification::WebP,
                "byte {} flipped",
                idx
            );
        }
    }

    #[test]
    fn test_other_images() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        assert_eq!(classify_bytes(&png), Classification::OtherImage);

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0, 1];
        assert_eq!(classify_bytes(&jpeg), Classification::OtherImage);
    }

    #[test]
    fn test_text_is_not_an_image() {
        assert_eq!(
            classify_bytes(b"hello, world! this is text"),
            Classification::NotAnImage
        );
    }

    #[test]
    fn test_short_input_is_unreadable() {
        assert_eq!(classify_bytes(b"RIFF"), Classification::Unreadable);
        assert_eq!(classify_bytes(&[]), Classification::Unreadable);
    }

    #[tokio::test]
    async fn test_classify_file_ignores_extension() {
        let temp = TempDir::new().unwrap();

        let disguised = temp.path().join("cover.jpg");
        std::fs::write(&disguised, webp_header()).unwrap();
        assert_eq!(classify_file(&disguised).await, Classification::WebP);

        let fake = temp.path().join("screenshot.webp");
        std::fs::write(&fake, b"not really an image at all").unwrap();
        assert_eq!(classify_file(&fake).await, Classification::NotAnImage);

        let blob = temp.path().join("ab12cd34ef");
        std::fs::write(&blob, webp_header()).unwrap();
        assert_eq!(classify_file(&blob).await, Classification::WebP);
    }

    #[tokio::test]
    async fn test_classify_file_missing_and_truncated() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            classify_file(&temp.path().join("missing")).await,
            Classification::Unreadable
        );

        let truncated = temp.path().join("truncated");
        std::fs::write(&truncated, b"RIFF\x00\x00").unwrap();
        assert_eq!(classify_file(&truncated).await, Classification::Unreadable);
        assert_eq!(read_signature(&truncated).await.unwrap().len(), 6);
    }
}
