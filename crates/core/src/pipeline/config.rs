//! Validated configuration for the pipeline.

use serde::Serialize;

use crate::config::{ConfigError, PipelineSettings, MAX_QUALITY, MIN_QUALITY};

/// Pipeline options after validation.
///
/// Built once from [`PipelineSettings`]; the runner never looks at raw values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    /// Suppress every mutation.
    pub dry_run: bool,
    /// Remove the source after a successful conversion.
    pub delete_original: bool,
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Skip records whose converted asset already exists.
    pub convert_only_missing: bool,
    /// Rewrite references of non-WebP assets without converting.
    pub rebuild_paths_only: bool,
    /// Skip records with more than one associated image.
    pub skip_multi_image: bool,
    /// Maximum processed records per run, 0 = unlimited.
    pub batch_limit: usize,
    /// Write a report file at the end of the run.
    pub write_report: bool,
    /// Report intended actions without performing any.
    pub preview_mode: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            delete_original: false,
            quality: 90,
            convert_only_missing: false,
            rebuild_paths_only: false,
            skip_multi_image: false,
            batch_limit: 0,
            write_report: false,
            preview_mode: false,
        }
    }
}

impl PipelineSettings {
    /// Checks bounds and converts to the typed form.
    pub fn validated(&self) -> Result<PipelineConfig, ConfigError> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(ConfigError::ValidationError(format!(
                "pipeline.quality must be between {} and {}, got {}",
                MIN_QUALITY, MAX_QUALITY, self.quality
            )));
        }
        let quality = u8::try_from(self.quality).map_err(|_| {
            ConfigError::ValidationError(format!("pipeline.quality out of range: {}", self.quality))
        })?;

        let batch_limit = usize::try_from(self.batch_limit).map_err(|_| {
            ConfigError::ValidationError(format!(
                "pipeline.batch_limit cannot be negative, got {}",
                self.batch_limit
            ))
        })?;

        Ok(PipelineConfig {
            dry_run: self.dry_run,
            delete_original: self.delete_original,
            quality,
            convert_only_missing: self.convert_only_missing,
            rebuild_paths_only: self.rebuild_paths_only,
            skip_multi_image: self.skip_multi_image,
            batch_limit,
            write_report: self.write_report,
            preview_mode: self.preview_mode,
        })
    }
}
