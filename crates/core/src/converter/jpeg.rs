//! JPEG converter built on the `image` crate.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use tracing::debug;

use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ColorHandling, ConversionResult};

/// Converter that decodes any supported format and re-encodes as baseline JPEG.
///
/// Decoding and encoding are CPU bound, so the work runs on tokio's blocking
/// pool.
#[derive(Debug, Clone, Default)]
pub struct JpegConverter;

impl JpegConverter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Converter for JpegConverter {
    fn name(&self) -> &str {
        "jpeg"
    }

    async fn convert(
        &self,
        input: Vec<u8>,
        quality: u8,
    ) -> Result<ConversionResult, ConverterError> {
        let input_len = input.len();
        let result = tokio::task::spawn_blocking(move || encode_jpeg(&input, quality))
            .await
            .map_err(|e| ConverterError::TaskFailed {
                reason: e.to_string(),
            })??;

        debug!(
            "Converted {} bytes to {}x{} JPEG ({} bytes, q{}, {:?})",
            input_len,
            result.width,
            result.height,
            result.size_bytes(),
            quality,
            result.color
        );
        Ok(result)
    }
}

/// Decodes `input` and encodes it as JPEG at `quality`.
///
/// Images with an alpha channel (including palette images with transparency)
/// are composited onto white first. Deterministic for a given input, quality
/// and `image` version.
pub fn encode_jpeg(input: &[u8], quality: u8) -> Result<ConversionResult, ConverterError> {
    if !(1..=100).contains(&quality) {
        return Err(ConverterError::InvalidQuality { quality });
    }

    let decoded = image::load_from_memory(input).map_err(|e| ConverterError::decode(e.to_string()))?;

    let (rgb, color) = match decoded {
        DynamicImage::ImageRgb8(buf) => (buf, ColorHandling::Direct),
        other if other.color().has_alpha() => (flatten_onto_white(&other), ColorHandling::FlattenedOnWhite),
        other => (other.to_rgb8(), ColorHandling::Converted),
    };

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(&rgb)
        .map_err(|e| ConverterError::encode(e.to_string()))?;

    Ok(ConversionResult {
        jpeg,
        width: rgb.width(),
        height: rgb.height(),
        quality,
        color,
    })
}

/// Composites an image onto an opaque white background using its alpha
/// channel as the mask. Fully opaque pixels keep their exact color.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let px = rgba.get_pixel(x, y);
        let alpha = u16::from(px[3]);
        let blend = |channel: u8| -> u8 {
            ((u16::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        Rgb([blend(px[0]), blend(px[1]), blend(px[2])])
    })
}
