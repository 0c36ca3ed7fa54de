//! Converter module for re-encoding screenshots.
//!
//! Decodes whatever the `image` crate understands (WebP in practice) and
//! writes baseline JPEG. Alpha is composited onto white because JPEG has no
//! transparency.
//!
//! # Example
//!
//! ```ignore
//! use reshoot_core::converter::{Converter, JpegConverter};
//!
//! let converter = JpegConverter::new();
//! let result = converter.convert(webp_bytes, 90).await?;
//! std::fs::write("screenshot.jpg", &result.jpeg)?;
//! ```

mod error;
mod jpeg;
mod traits;
mod types;

pub use error::ConverterError;
pub use jpeg::{encode_jpeg, flatten_onto_white, JpegConverter};
pub use traits::Converter;
pub use types::{ColorHandling, ConversionResult};
