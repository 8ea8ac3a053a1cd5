//! Sync command arguments

use std::path::PathBuf;

use clap::Args;

use crate::sync::RunMode;

pub mod handler;

pub use handler::handle_sync_command;

/// Exactly one of `--dry-run` / `--sync` must be given
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ModeArgs {
    /// Validate and show what would change
    #[arg(long)]
    pub dry_run: bool,

    /// Perform sync
    #[arg(long)]
    pub sync: bool,
}

impl ModeArgs {
    pub fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Sync
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    #[command(flatten)]
    pub mode: ModeArgs,

    /// CSV mapping file: sheet_col,crm_field
    #[arg(long, default_value = "mapping.csv")]
    pub mapping: PathBuf,

    /// Environment file loaded before reading configuration
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,
}
