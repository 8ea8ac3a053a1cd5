//! Sync command handler

use anyhow::{Context, Result};
use colored::*;
use log::{debug, info};

use super::SyncArgs;
use crate::api::{CrmClient, Transport};
use crate::config::Config;
use crate::sheets::{SheetRow, fetch_sheet_rows};
use crate::sync::mapping::FieldMapping;
use crate::sync::{RunMode, RunSummary, SyncOptions, load_mapping, run_sync, write_log};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The sheet had no data rows; nothing was looked up or logged
    NoRows,
    /// Every row was reconciled and the log written
    Completed(RunSummary),
}

/// Handle the sync command
///
/// Configuration problems surface as [`crate::config::ConfigError`] before
/// any file or network access.
pub async fn handle_sync_command(args: SyncArgs) -> Result<()> {
    load_env_file(&args)?;
    let config = Config::from_env()?;
    let mode = args.mode.mode();

    let mapping = load_mapping(&args.mapping)?;

    let rows = fetch_sheet_rows(&config.sheets)
        .await
        .context("Failed to fetch spreadsheet rows")?;
    let crm = CrmClient::from_config(&config.crm)?;

    sync_rows(&config, &mapping, mode, &rows, &crm).await?;
    Ok(())
}

/// Reconcile fetched rows, write the log and print the summary
pub async fn sync_rows<T: Transport>(
    config: &Config,
    mapping: &FieldMapping,
    mode: RunMode,
    rows: &[SheetRow],
    crm: &CrmClient<T>,
) -> Result<RunOutcome> {
    if rows.is_empty() {
        println!("No rows found.");
        return Ok(RunOutcome::NoRows);
    }

    let options = SyncOptions {
        unique_key_column: config.unique_key_column.clone(),
        mode,
    };

    if mode == RunMode::DryRun {
        println!("{}", "Dry run: no CRM records will be changed".yellow());
    }

    let entries = run_sync(rows, mapping, crm, &options)
        .await
        .context("CRM lookup failed")?;

    write_log(&config.log_path, &entries)?;
    info!("Wrote {} log entries", entries.len());

    let summary = RunSummary::from_entries(&entries);
    print_summary(&summary, mode);
    println!(
        "Done. Log saved to: {}",
        config.log_path.display().to_string().bright_green()
    );

    Ok(RunOutcome::Completed(summary))
}

/// Load the env file into the process environment
///
/// Variables already set in the environment win; a missing file is ignored.
fn load_env_file(args: &SyncArgs) -> Result<()> {
    match dotenvy::from_path(&args.env_file) {
        Ok(()) => {
            debug!("Loaded environment from {}", args.env_file.display());
            Ok(())
        }
        Err(err) if err.not_found() => {
            debug!("No env file at {}", args.env_file.display());
            Ok(())
        }
        Err(err) => Err(err)
            .with_context(|| format!("Failed to load env file: {}", args.env_file.display())),
    }
}

fn print_summary(summary: &RunSummary, mode: RunMode) {
    println!("Processed {} rows", summary.total());
    match mode {
        RunMode::Sync => println!("  {:<8} {}", "updated".green(), summary.updated),
        RunMode::DryRun => println!("  {:<8} {}", "dry_run".cyan(), summary.dry_run),
    }
    println!("  {:<8} {}", "skipped".yellow(), summary.skipped);
    if summary.errors > 0 {
        println!("  {:<8} {}", "error".red().bold(), summary.errors);
    } else {
        println!("  {:<8} {}", "error", summary.errors);
    }
}
