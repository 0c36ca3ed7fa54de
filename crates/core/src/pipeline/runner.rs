//! Pipeline runner.
//!
//! Records are handled strictly one after another: a record is classified,
//! converted, persisted and cleaned up before the next one is looked at,
//! because conversion may delete the very file discovery located.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::converter::Converter;
use crate::discovery::{AssetLocation, CandidateAsset, ContentDiscovery};
use crate::metadata::{MetadataClient, Record};
use crate::persist::ScreenshotPersister;

use super::config::PipelineConfig;
use super::error::{ItemError, PipelineError};
use super::report::ReportWriter;
use super::types::{
    RecordError, RecordOutcome, Replacement, ReplacementAction, RunReport, RunStats, SkipReason,
};

/// Callback invoked with `(visited, total)` before each record.
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Mutable state of one run.
struct RunState {
    stats: RunStats,
    lines: Vec<String>,
}

/// Reconciles WebP screenshots of every record into JPEG.
pub struct Pipeline {
    config: PipelineConfig,
    metadata: Arc<dyn MetadataClient>,
    discovery: Arc<dyn ContentDiscovery>,
    converter: Arc<dyn Converter>,
    persister: Arc<dyn ScreenshotPersister>,
    report_dir: PathBuf,
    progress: Option<ProgressCallback>,
}

impl Pipeline {
    /// Create a new pipeline.
    pub fn new(
        config: PipelineConfig,
        metadata: Arc<dyn MetadataClient>,
        discovery: Arc<dyn ContentDiscovery>,
        converter: Arc<dyn Converter>,
        persister: Arc<dyn ScreenshotPersister>,
    ) -> Self {
        Self {
            config,
            metadata,
            discovery,
            converter,
            persister,
            report_dir: PathBuf::from("."),
            progress: None,
        }
    }

    /// Directory receiving the report when `write_report` is set.
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    /// Register a progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run over every record once.
    ///
    /// Only an unusable report directory or a failed listing abort the run;
    /// everything else is recorded per record.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let cfg = &self.config;
        info!(
            "Starting run: discovery={}, persister={}, quality={}, dry_run={}, preview={}, batch_limit={}",
            self.discovery.name(),
            self.persister.name(),
            cfg.quality,
            cfg.dry_run,
            cfg.preview_mode,
            cfg.batch_limit
        );

        let writer = if cfg.write_report {
            Some(ReportWriter::prepare(&self.report_dir).await?)
        } else {
            None
        };

        let records = self
            .metadata
            .list_all_records()
            .await
            .map_err(PipelineError::Listing)?;
        let total = records.len();
        info!("Fetched {} records from {}", total, self.metadata.name());

        let mut run = RunState {
            stats: RunStats::new(total),
            lines: Vec::new(),
        };

        for (idx, record) in records.iter().enumerate() {
            if cfg.batch_limit > 0 && run.stats.processed >= cfg.batch_limit {
                info!(
                    "Batch limit of {} reached, leaving {} records untouched",
                    cfg.batch_limit,
                    total - idx
                );
                break;
            }

            let visited = idx + 1;
            info!("[{}/{}] Record {} ({})", visited, total, record.id, record.display_title());
            if let Some(progress) = &self.progress {
                progress(visited, total);
            }

            let outcome = self.process_record(record, &mut run).await;
            debug!("Record {}: {:?}", record.id, outcome);
        }

        let stats = &run.stats;
        info!(
            "Done. Processed {} records, converted {}, {} errors",
            stats.processed,
            stats.converted,
            stats.errors.len()
        );

        let report_path = match writer {
            Some(writer) => match writer.write(&run.lines).await {
                Ok(path) => {
                    info!("Report written to {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    warn!("Failed to write report in {}: {}", writer.dir().display(), e);
                    None
                }
            },
            None => None,
        };

        Ok(RunReport {
            stats: run.stats,
            lines: run.lines,
            report_path,
        })
    }

    /// Evaluates the guards in order; the first one that matches decides.
    async fn process_record(&self, record: &Record, run: &mut RunState) -> RecordOutcome {
        let cfg = &self.config;

        let Some(reference) = record.screenshot() else {
            debug!("Record {}: skipped, no screenshot", record.id);
            return RecordOutcome::Skipped(SkipReason::NoScreenshot);
        };

        if cfg.skip_multi_image && record.image_refs.len() > 1 {
            debug!(
                "Record {}: skipped, {} associated images",
                record.id,
                record.image_refs.len()
            );
            return RecordOutcome::Skipped(SkipReason::MultipleImages);
        }

        let asset = match self.discovery.inspect(record).await {
            Ok(asset) => asset,
            Err(e) => {
                self.record_error(record, reference, e.into(), run);
                return RecordOutcome::Failed;
            }
        };
        let is_webp = asset.as_ref().is_some_and(|a| a.classification.is_webp());
        if is_webp {
            run.stats.found += 1;
        }

        if cfg.convert_only_missing {
            if let Some(asset) = &asset {
                if self.persister.target_exists(&asset.location).await {
                    debug!("Record {}: skipped, converted screenshot exists", record.id);
                    return RecordOutcome::Skipped(SkipReason::TargetExists);
                }
            }
        }

        if cfg.preview_mode {
            self.preview(record, reference, asset.as_ref(), run);
            return RecordOutcome::Previewed;
        }

        if cfg.rebuild_paths_only && !is_webp {
            return self.rewrite_path(record, reference, run).await;
        }

        let Some(asset) = asset else {
            debug!("Record {}: skipped, {} not located", record.id, reference);
            return RecordOutcome::Skipped(SkipReason::NotFound);
        };
        if !is_webp {
            debug!(
                "Record {}: skipped, screenshot is {}",
                record.id, asset.classification
            );
            return RecordOutcome::Skipped(SkipReason::NotWebp(asset.classification));
        }

        self.convert(record, reference, &asset.location, run).await
    }

    fn preview(
        &self,
        record: &Record,
        reference: &str,
        asset: Option<&CandidateAsset>,
        run: &mut RunState,
    ) {
        run.stats.processed += 1;

        let line = match asset {
            Some(asset) if asset.classification.is_webp() => {
                let planned = self
                    .persister
                    .planned_ref(&asset.location)
                    .unwrap_or_else(|_| asset.location.to_string());
                run.stats.replacements.push(Replacement {
                    id: record.id.clone(),
                    title: record.title.clone(),
                    original_ref: reference.to_string(),
                    new_ref: planned.clone(),
                    action: ReplacementAction::Preview,
                });
                format!("[PREVIEW] Would convert: {} -> {}", reference, planned)
            }
            _ if self.config.rebuild_paths_only => {
                format!("[PREVIEW] Would rewrite path: {}", reference)
            }
            Some(asset) => format!(
                "[PREVIEW] Would skip: {} ({})",
                reference, asset.classification
            ),
            None => format!("[PREVIEW] Would skip: {} (not found)", reference),
        };

        info!("{}", line);
        run.lines.push(line);
    }

    async fn rewrite_path(&self, record: &Record, reference: &str, run: &mut RunState) -> RecordOutcome {
        run.stats.processed += 1;

        if self.config.dry_run {
            let line = format!("[DRY RUN] Would rewrite path: {}", reference);
            info!("{}", line);
            run.lines.push(line);
            return RecordOutcome::PathRewritten;
        }

        match self.metadata.set_screenshot_path(&record.id, reference).await {
            Ok(()) => {
                let line = format!("Rewrote path: {}", reference);
                info!("{}", line);
                run.lines.push(line);
                RecordOutcome::PathRewritten
            }
            Err(e) => {
                self.record_error(record, reference, e.into(), run);
                RecordOutcome::Failed
            }
        }
    }

    async fn convert(
        &self,
        record: &Record,
        reference: &str,
        location: &AssetLocation,
        run: &mut RunState,
    ) -> RecordOutcome {
        run.stats.processed += 1;

        let result = if self.config.dry_run {
            self.persister.planned_ref(location).map_err(ItemError::from)
        } else {
            self.convert_and_persist(record, location).await
        };

        let new_ref = match result {
            Ok(new_ref) => new_ref,
            Err(e) => {
                self.record_error(record, reference, e, run);
                return RecordOutcome::Failed;
            }
        };

        let (action, line) = if self.config.dry_run {
            (
                ReplacementAction::DryRun,
                format!("[DRY RUN] Would convert: {} -> {}", reference, new_ref),
            )
        } else {
            (
                ReplacementAction::Converted,
                format!("Converted: {} -> {}", reference, new_ref),
            )
        };

        info!("{}", line);
        run.lines.push(line);
        run.stats.converted += 1;
        run.stats.replacements.push(Replacement {
            id: record.id.clone(),
            title: record.title.clone(),
            original_ref: reference.to_string(),
            new_ref,
            action,
        });
        RecordOutcome::Converted
    }

    /// Read, convert, persist and optionally delete. Side effects that already
    /// happened stay in place when a later step fails.
    async fn convert_and_persist(
        &self,
        record: &Record,
        location: &AssetLocation,
    ) -> Result<String, ItemError> {
        let bytes = self.discovery.read(location).await?;
        let result = self.converter.convert(bytes, self.config.quality).await?;
        let new_ref = self.persister.persist(record, location, &result.jpeg).await?;

        if self.config.delete_original {
            self.persister.remove_original(location).await?;
        }
        Ok(new_ref)
    }

    fn record_error(&self, record: &Record, reference: &str, error: ItemError, run: &mut RunState) {
        let error = RecordError {
            id: record.id.clone(),
            reference: reference.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        };
        warn!("{}", error);
        run.lines.push(format!("Error: {}", error));
        run.stats.errors.push(error);
    }
}
