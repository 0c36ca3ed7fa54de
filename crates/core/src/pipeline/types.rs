//! Types for the pipeline module.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::classifier::Classification;
use crate::error::FailureKind;

/// What happened to a record that produced a replacement entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementAction {
    /// Converted and persisted.
    Converted,
    /// Would have been converted; nothing was changed.
    DryRun,
    /// Advisory entry from preview mode.
    Preview,
}

/// A (possibly advisory) screenshot replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Replacement {
    pub id: String,
    pub title: String,
    pub original_ref: String,
    pub new_ref: String,
    pub action: ReplacementAction,
}

/// A recovered per-record failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
    pub id: String,
    /// Screenshot path or URL being processed.
    pub reference: String,
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {} ({}): {}", self.id, self.reference, self.message)
    }
}

/// Counters and results of one run.
///
/// Counters only ever grow during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total_records: usize,
    /// Records advanced past the skip guards.
    pub processed: usize,
    /// Records whose screenshot classified as WebP.
    pub found: usize,
    /// Successful conversions, dry-run conversions included.
    #[serde(rename = "replaced")]
    pub converted: usize,
    pub replacements: Vec<Replacement>,
    pub errors: Vec<RecordError>,
}

impl RunStats {
    pub fn new(total_records: usize) -> Self {
        Self {
            total_records,
            ..Default::default()
        }
    }
}

/// Why a record was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoScreenshot,
    MultipleImages,
    TargetExists,
    /// The discovery strategy could not locate the reference.
    NotFound,
    NotWebp(Classification),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoScreenshot => f.write_str("no screenshot"),
            Self::MultipleImages => f.write_str("multiple images"),
            Self::TargetExists => f.write_str("converted screenshot already exists"),
            Self::NotFound => f.write_str("screenshot not found"),
            Self::NotWebp(classification) => write!(f, "not webp ({})", classification),
        }
    }
}

/// Result of running the guards and actions for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Skipped(SkipReason),
    Previewed,
    PathRewritten,
    Converted,
    Failed,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub stats: RunStats,
    /// One line per processed or failed record, in processing order.
    pub lines: Vec<String>,
    /// Where the report file was written, if it was.
    pub report_path: Option<PathBuf>,
}

impl RunReport {
    pub fn into_outcome(self) -> RunOutcome {
        RunOutcome {
            success: true,
            stats: Some(self.stats),
            report_path: self.report_path,
            error: None,
        }
    }
}

/// Process result printed at the end of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RunStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunOutcome {
    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            success: false,
            stats: None,
            report_path: None,
            error: Some(error.to_string()),
        }
    }
}
