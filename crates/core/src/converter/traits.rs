//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::error::ConverterError;
use super::types::ConversionResult;

/// A converter that re-encodes image bytes as JPEG.
///
/// Implementations never touch the filesystem or the network; callers own
/// reading the source and storing the result.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Converts arbitrary image bytes to JPEG at `quality` (1-100).
    async fn convert(&self, input: Vec<u8>, quality: u8)
        -> Result<ConversionResult, ConverterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ColorHandling;

    struct EchoConverter;

    #[async_trait]
    impl Converter for EchoConverter {
        fn name(&self) -> &str {
            "echo"
        }

        async fn convert(
            &self,
            input: Vec<u8>,
            quality: u8,
        ) -> Result<ConversionResult, ConverterError> {
            if input.is_empty() {
                return Err(ConverterError::decode("empty input"));
            }
            Ok(ConversionResult {
                jpeg: input,
                width: 1,
                height: 1,
                quality,
                color: ColorHandling::Direct,
            })
        }
    }

    #[tokio::test]
    async fn test_converter_trait_object() {
        let converter: Box<dyn Converter> = Box::new(EchoConverter);
        let result = converter.convert(vec![1, 2, 3], 80).await.unwrap();
        assert_eq!(result.size_bytes(), 3);
        assert_eq!(result.quality, 80);
        assert!(converter.convert(Vec::new(), 80).await.is_err());
    }
}
