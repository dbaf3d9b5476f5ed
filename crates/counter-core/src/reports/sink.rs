//! Report persistence.
//!
//! [`ReportSink`] is the seam between rollup generation and storage.
//! Production uses [`DailyFileSink`], which appends JSON lines to one file
//! per calendar day. [`MemorySink`] backs tests and runs with persistence
//! disabled.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::record::ReportRecord;

/// Errors raised while persisting a report record.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("failed to serialize report record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for generated report records.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Appends one record. Implementations must not reorder records within a
    /// single caller.
    async fn append(&self, record: &ReportRecord) -> Result<(), ReportError>;
}

/// Appends records as JSON lines under `directory`, one file per day.
///
/// Files are named `reports_YYYY-MM-DD.json` after the record's generation
/// date, so a record written just past midnight lands in the new day's file.
#[derive(Debug, Clone)]
pub struct DailyFileSink {
    directory: PathBuf,
}

impl DailyFileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    #[must_use]
    pub fn file_for(&self, date: DateTime<Utc>) -> PathBuf {
        self.directory
            .join(format!("reports_{}.json", date.format("%Y-%m-%d")))
    }

    fn io_err(path: &Path, source: std::io::Error) -> ReportError {
        ReportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl ReportSink for DailyFileSink {
    async fn append(&self, record: &ReportRecord) -> Result<(), ReportError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let path = self.file_for(record.date);
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| Self::io_err(&self.directory, e))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| Self::io_err(&path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| Self::io_err(&path, e))?;

        debug!(kind = record.kind.as_str(), path = %path.display(), "report persisted");
        Ok(())
    }
}

/// Keeps records in memory, in append order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<VecDeque<ReportRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    #[must_use]
    pub fn records(&self) -> Vec<ReportRecord> {
        self.records
            .lock()
            .map(|records| records.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReportSink for MemorySink {
    async fn append(&self, record: &ReportRecord) -> Result<(), ReportError> {
        if let Ok(mut records) = self.records.lock() {
            records.push_back(record.clone());
        }
        Ok(())
    }
}
