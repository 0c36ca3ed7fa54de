//! Timestamped text report of a run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::error::PipelineError;

/// Writes `conversion_report_YYYYmmdd_HHMMSS.txt` files into a directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Creates the directory if needed and checks it is one.
    ///
    /// Called before any record is touched, so an unusable directory aborts
    /// the run instead of surfacing after all the work is done.
    pub async fn prepare(dir: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let dir = dir.into();
        let checked = match tokio::fs::create_dir_all(&dir).await {
            Ok(()) => tokio::fs::metadata(&dir).await,
            Err(e) => Err(e),
        };
        let metadata = checked.map_err(|source| PipelineError::ReportDirectory {
            path: dir.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(PipelineError::ReportDirectory {
                source: std::io::Error::other("not a directory"),
                path: dir,
            });
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(at: DateTime<Local>) -> String {
        format!("conversion_report_{}.txt", at.format("%Y%m%d_%H%M%S"))
    }

    /// Writes `lines` to a new report file stamped with the current time.
    pub async fn write(&self, lines: &[String]) -> std::io::Result<PathBuf> {
        let path = self.dir.join(Self::file_name(Local::now()));
        let mut contents = lines.join("\n");
        contents.push('\n');
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }
}
