//! Persisting converted screenshots.
//!
//! [`PathPersister`] writes the JPEG next to the source blob and repoints the
//! record's screenshot path. [`EmbeddedPersister`] uploads the JPEG inline as
//! a data URI, for deployments where no writable local path exists.

mod embedded;
mod error;
mod path;
mod traits;

pub use embedded::EmbeddedPersister;
pub use error::PersistError;
pub use path::{jpeg_target, PathPersister};
pub use traits::ScreenshotPersister;
