//! The reconciliation pipeline.
//!
//! For every record returned by the metadata store, guards are evaluated in a
//! fixed order and the first match decides what happens:
//!
//! 1. no screenshot reference: skip
//! 2. `skip_multi_image` and more than one image: skip
//! 3. `convert_only_missing` and the converted asset exists: skip
//! 4. `preview_mode`: report the intended action, change nothing
//! 5. `rebuild_paths_only` and not WebP: rewrite the reference unchanged
//! 6. not WebP: skip
//! 7. convert, persist, optionally delete the original
//!
//! The batch limit is checked before guard 1. Failures in steps 5 and 7 are
//! recorded against the record and never stop the loop, as are screenshots
//! that were located but could not be read. A screenshot that cannot be
//! located at all is skipped at step 6.
//!
//! In preview mode every record reaching step 4 counts as processed, including
//! ones that would be skipped or only have their path rewritten, so a batch
//! limit combined with preview covers fewer convertible records than the same
//! limit on a real run.

mod config;
mod error;
mod report;
mod runner;
mod strategy;
mod types;

pub use config::PipelineConfig;
pub use error::{ItemError, PipelineError};
pub use report::ReportWriter;
pub use runner::{Pipeline, ProgressCallback};
pub use strategy::Strategy;
pub use types::{
    RecordError, RecordOutcome, Replacement, ReplacementAction, RunOutcome, RunReport, RunStats,
    SkipReason,
};
