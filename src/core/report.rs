use crate::domain::model::BatchSummary;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 單次執行的 JSON 報告
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub tool: &'a str,
    pub source: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: &'a BatchSummary,
}

impl<'a> RunReport<'a> {
    pub fn new(
        tool: &'a str,
        source: impl Into<PathBuf>,
        started_at: DateTime<Utc>,
        summary: &'a BatchSummary,
    ) -> Self {
        Self {
            tool,
            source: source.into(),
            started_at,
            finished_at: Utc::now(),
            summary,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!("Report written to {}", path.display());
        Ok(())
    }
}
