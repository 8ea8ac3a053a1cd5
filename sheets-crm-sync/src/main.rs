mod api;
mod cli;
mod config;
mod sheets;
mod sync;

use std::process::ExitCode;

use clap::Parser;
use colored::*;

use cli::Cli;
use config::ConfigError;

/// Exit code for usage and configuration errors
const EXIT_CONFIG: u8 = 2;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli::commands::sync::handle_sync_command(cli.sync).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(config_err) = err.downcast_ref::<ConfigError>() {
                eprintln!("{}", config_err.to_string().red());
                return ExitCode::from(EXIT_CONFIG);
            }
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
