//! Spreadsheet-to-CRM synchronization
//!
//! Row mapping, the per-row reconciliation loop and the run log.

pub mod mapping;
pub mod orchestrator;
pub mod run_log;

pub use mapping::load_mapping;
pub use orchestrator::{RunMode, SyncOptions, run_sync};
pub use run_log::{RunSummary, write_log};
