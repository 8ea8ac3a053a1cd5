//! Per-row outcome log, persisted as CSV at the end of a run

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

pub const LOG_COLUMNS: [&str; 4] = ["sheet_row", "status", "reason", "record_id"];

pub const REASON_NOT_FOUND_IN_CRM: &str = "not_found_in_crm";
pub const REASON_CRM_MISSING_ID: &str = "crm_missing_id";
pub const REASON_WOULD_UPDATE: &str = "would_update";

pub fn missing_unique_key_reason(column: &str) -> String {
    format!("missing_unique_key:{}", column)
}

/// Terminal outcome of one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Skipped,
    DryRun,
    Updated,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Skipped => "skipped",
            SyncStatus::DryRun => "dry_run",
            SyncStatus::Updated => "updated",
            SyncStatus::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// 1-based sheet row; the header is row 1
    pub sheet_row: usize,
    pub status: SyncStatus,
    pub reason: Option<String>,
    pub record_id: Option<String>,
}

impl LogEntry {
    pub fn skipped(sheet_row: usize, reason: impl Into<String>) -> Self {
        Self {
            sheet_row,
            status: SyncStatus::Skipped,
            reason: Some(reason.into()),
            record_id: None,
        }
    }

    pub fn dry_run(sheet_row: usize, record_id: impl Into<String>) -> Self {
        Self {
            sheet_row,
            status: SyncStatus::DryRun,
            reason: Some(REASON_WOULD_UPDATE.to_string()),
            record_id: Some(record_id.into()),
        }
    }

    pub fn updated(sheet_row: usize, record_id: impl Into<String>) -> Self {
        Self {
            sheet_row,
            status: SyncStatus::Updated,
            reason: None,
            record_id: Some(record_id.into()),
        }
    }

    pub fn error(sheet_row: usize, reason: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            sheet_row,
            status: SyncStatus::Error,
            reason: Some(reason.into()),
            record_id: Some(record_id.into()),
        }
    }
}

/// Write log entries as CSV, header first
pub fn write_log_to<W: io::Write>(writer: W, entries: &[LogEntry]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv.write_record(LOG_COLUMNS)
        .context("Failed to write log header")?;
    for entry in entries {
        csv.serialize(entry)
            .with_context(|| format!("Failed to write log entry for row {}", entry.sheet_row))?;
    }
    csv.flush().context("Failed to flush log")?;
    Ok(())
}

/// Write the run log to a file, replacing any previous log
pub fn write_log(path: &Path, entries: &[LogEntry]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;
    write_log_to(file, entries)
}

/// Status counts of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub updated: usize,
    pub dry_run: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut summary, entry| {
            match entry.status {
                SyncStatus::Updated => summary.updated += 1,
                SyncStatus::DryRun => summary.dry_run += 1,
                SyncStatus::Skipped => summary.skipped += 1,
                SyncStatus::Error => summary.errors += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.updated + self.dry_run + self.skipped + self.errors
    }
}
