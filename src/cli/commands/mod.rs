//! Command implementations for the pCO₂ processor CLI
//!
//! This module contains the command execution logic, progress reporting,
//! and error handling for the CLI interface. Each command is implemented in
//! its own module.

pub mod check_config;
pub mod process;
pub mod shared;

pub use shared::ProcessingStats;

use crate::Result;
use crate::cli::args::{Args, Commands};
use tokio_util::sync::CancellationToken;

/// Main command runner
///
/// Dispatches to the subcommand handler:
/// - `process`: dataset processing with JSON and tabular output
/// - `check-config`: configuration validation and summary
pub async fn run(args: Args, cancellation_token: CancellationToken) -> Result<ProcessingStats> {
    match args.command {
        Some(Commands::Process(process_args)) => {
            process::run_process(process_args, cancellation_token).await
        }
        Some(Commands::CheckConfig(check_args)) => check_config::run_check_config(check_args).await,
        None => Ok(ProcessingStats::default()),
    }
}
