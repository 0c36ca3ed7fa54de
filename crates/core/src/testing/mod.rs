//! Testing utilities and mock implementations.
//!
//! Provides a scripted [`MockMetadataClient`] and in-memory image fixtures so
//! the pipeline can be exercised end to end without a media server.
//!
//! # Example
//!
//! ```rust,ignore
//! use reshoot_core::testing::{fixtures, MockMetadataClient};
//!
//! let metadata = MockMetadataClient::with_records(vec![
//!     fixtures::record("1", "x.webp"),
//! ]);
//! std::fs::write(store.join("x.webp"), fixtures::webp_bytes(8, 8))?;
//! ```

mod mock_metadata;

pub use mock_metadata::MockMetadataClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    use crate::metadata::Record;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x * 31 + y * 17) % 256) as u8,
            ])
        })
    }

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), format)
            .expect("in-memory encode");
        bytes
    }

    /// Opaque WebP image.
    pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
        encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::WebP)
    }

    /// WebP with a fully transparent top-left quadrant.
    pub fn webp_bytes_with_alpha(width: u32, height: u32) -> Vec<u8> {
        let rgb = gradient(width, height);
        let rgba = RgbaImage::from_fn(width, height, |x, y| {
            let px = rgb.get_pixel(x, y);
            let alpha = if x < width / 2 && y < height / 2 { 0 } else { 255 };
            Rgba([px[0], px[1], px[2], alpha])
        });
        encode(DynamicImage::ImageRgba8(rgba), ImageFormat::WebP)
    }

    /// Opaque PNG image.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Png)
    }

    /// Bytes that pass the WebP signature check but do not decode.
    pub fn corrupt_webp_bytes() -> Vec<u8> {
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&[0x40, 0, 0, 0]);
        bytes.extend_from_slice(b"WEBPVP8 ");
        bytes.extend_from_slice(&[0xAB; 32]);
        bytes
    }

    /// Record with a screenshot reference.
    pub fn record(id: &str, screenshot: &str) -> Record {
        Record::new(id, format!("Scene {}", id)).with_screenshot(screenshot)
    }
}
