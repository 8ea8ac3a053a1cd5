//! Command-line interface

pub mod commands;

use clap::Parser;

use commands::sync::SyncArgs;

#[derive(Parser, Debug)]
#[command(name = "sheets-crm-sync")]
#[command(about = "Sync Google Sheets rows to CRM via REST API", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub sync: SyncArgs,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}
