//! Per-row reconciliation loop
//!
//! Each row is resolved completely (lookup, mapping, optional update) before
//! the next one starts, and ends in exactly one log entry. Rows share no
//! state; the log keeps spreadsheet order.

use log::{debug, info, warn};

use super::mapping::{FieldMapping, map_row};
use super::run_log::{
    LogEntry, REASON_CRM_MISSING_ID, REASON_NOT_FOUND_IN_CRM, missing_unique_key_reason,
};
use crate::api::{CrmClient, CrmError, Transport};
use crate::sheets::SheetRow;

/// Sheet row number of the first data row (the header is row 1)
pub const FIRST_DATA_ROW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Look up and map, but never update
    DryRun,
    /// Apply updates to the CRM
    Sync,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub unique_key_column: String,
    pub mode: RunMode,
}

/// Reconcile every row against the CRM
///
/// Update failures become `error` entries. Lookup failures abort the run.
pub async fn run_sync<T: Transport>(
    rows: &[SheetRow],
    mapping: &FieldMapping,
    crm: &CrmClient<T>,
    options: &SyncOptions,
) -> Result<Vec<LogEntry>, CrmError> {
    info!(
        "Reconciling {} rows on '{}' ({:?})",
        rows.len(),
        options.unique_key_column,
        options.mode
    );

    let mut entries = Vec::with_capacity(rows.len());
    for (offset, row) in rows.iter().enumerate() {
        let sheet_row = FIRST_DATA_ROW + offset;
        let entry = process_row(sheet_row, row, mapping, crm, options).await?;
        debug!(
            "Row {}: {} {}",
            sheet_row,
            entry.status,
            entry.reason.as_deref().unwrap_or("")
        );
        entries.push(entry);
    }
    Ok(entries)
}

async fn process_row<T: Transport>(
    sheet_row: usize,
    row: &SheetRow,
    mapping: &FieldMapping,
    crm: &CrmClient<T>,
    options: &SyncOptions,
) -> Result<LogEntry, CrmError> {
    let column = options.unique_key_column.as_str();
    let unique_value = row.value(column).trim().to_lowercase();
    if unique_value.is_empty() {
        return Ok(LogEntry::skipped(sheet_row, missing_unique_key_reason(column)));
    }

    let Some(record) = crm.find_by_key(column, &unique_value).await? else {
        return Ok(LogEntry::skipped(sheet_row, REASON_NOT_FOUND_IN_CRM));
    };

    let Some(record_id) = record.record_id() else {
        return Ok(LogEntry::skipped(sheet_row, REASON_CRM_MISSING_ID));
    };

    let payload = map_row(row, mapping);

    if options.mode == RunMode::DryRun {
        return Ok(LogEntry::dry_run(sheet_row, record_id));
    }

    match crm.update_record(&record_id, &payload).await {
        Ok(()) => Ok(LogEntry::updated(sheet_row, record_id)),
        Err(err) => {
            warn!("Row {}: update of record {} failed: {}", sheet_row, record_id, err);
            Ok(LogEntry::error(sheet_row, err.to_string(), record_id))
        }
    }
}
