//! Persists final reports
//! Author: kartik4091
//! Created: 2025-06-05

use std::path::PathBuf;

use tokio::fs as async_fs;
use tracing::{info, instrument};

use super::FinalReport;
use crate::error::{Error, Result};

/// Writes `<dir>/<record_id>_final_report.json`
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn report_path(&self, record_id: u64) -> PathBuf {
        self.output_dir
            .join(format!("{}_final_report.json", record_id))
    }

    #[instrument(skip(self, report), fields(record_id = report.record_id))]
    pub async fn write(&self, report: &FinalReport) -> Result<PathBuf> {
        async_fs::create_dir_all(&self.output_dir).await.map_err(|e| {
            Error::ReportError(format!("{}: {}", self.output_dir.display(), e))
        })?;

        let path = self.report_path(report.record_id);
        let content = report.to_json()?;
        async_fs::write(&path, content)
            .await
            .map_err(|e| Error::ReportError(format!("{}: {}", path.display(), e)))?;

        info!("📝 report written: {}", path.display());
        Ok(path)
    }
}
