//! Command-line argument definitions for the pCO₂ processor
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::{CompressionAlgorithm, ExportFormat};
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the pCO₂ processor
///
/// Aligns irregular CO₂ instrument readings into measurements, reduces them
/// to pCO₂/fCO₂ and runs the automatic QC cascade.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pco2-processor",
    version,
    about = "Reduce and quality-control underway CO₂ instrument datasets",
    long_about = "Processes CO₂ instrument datasets exported as JSON: applies sensor calibrations, \
                  marks flushing periods, runs automatic sensor QC, locates measurements, interpolates \
                  their input values, calculates pCO₂/fCO₂ and cascades post-reduction QC flags back \
                  to the sensor values that caused them."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process one or more datasets (main command)
    Process(ProcessArgs),
    /// Load and validate configuration, then print the sensor type graph
    CheckConfig(CheckConfigArgs),
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Dataset inputs
    ///
    /// Each input may be a dataset JSON file, a directory (searched
    /// recursively for *.json files) or a glob pattern.
    #[arg(value_name = "INPUT", required = true, help = "Dataset files, directories or glob patterns")]
    pub inputs: Vec<String>,

    /// Output directory
    ///
    /// Created if it doesn't exist. Each dataset produces
    /// <name>.reduced.json plus an optional Parquet or CSV export.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = "output",
        help = "Output directory for processed datasets"
    )]
    pub output_path: PathBuf,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// ~/.config/pco2_processor/config.toml and falls back to defaults.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Number of datasets processed concurrently
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Number of datasets processed concurrently (default: CPU count)"
    )]
    pub workers: Option<usize>,

    /// Only use GOOD or ASSUMED_GOOD sensor values when assembling measurements
    #[arg(
        long = "good-flags-only",
        help = "Only use good sensor values when assembling measurements"
    )]
    pub good_flags_only: bool,

    /// Export format for data reduction records
    #[arg(
        long = "format",
        value_enum,
        help = "Export format for data reduction records"
    )]
    pub export_format: Option<ExportFormatArg>,

    /// Parquet compression algorithm
    #[arg(
        long = "compression",
        value_enum,
        help = "Parquet compression algorithm"
    )]
    pub compression: Option<CompressionArg>,

    /// Perform a dry run without actual processing
    ///
    /// Lists the datasets that would be processed and where their outputs
    /// would be written.
    #[arg(
        long = "dry-run",
        help = "Show what would be processed without creating output files"
    )]
    pub dry_run: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the final report
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the check-config command
#[derive(Debug, Clone, Parser)]
pub struct CheckConfigArgs {
    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Output format options for the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

/// Export format choices on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    Parquet,
    Csv,
    None,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Parquet => ExportFormat::Parquet,
            ExportFormatArg::Csv => ExportFormat::Csv,
            ExportFormatArg::None => ExportFormat::None,
        }
    }
}

/// Compression choices on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    Snappy,
    Zstd,
    Lz4,
    None,
}

impl From<CompressionArg> for CompressionAlgorithm {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Snappy => CompressionAlgorithm::Snappy,
            CompressionArg::Zstd => CompressionAlgorithm::Zstd,
            CompressionArg::Lz4 => CompressionAlgorithm::Lz4,
            CompressionArg::None => CompressionAlgorithm::Uncompressed,
        }
    }
}

impl ProcessArgs {
    /// Validate the process command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.inputs.iter().all(|input| input.trim().is_empty()) {
            return Err(Error::configuration("At least one input must be given"));
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(Error::configuration(
                    "Number of workers must be greater than 0",
                ));
            }
            if workers > 256 {
                return Err(Error::configuration("Number of workers cannot exceed 256"));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if self.output_path.exists() && !self.output_path.is_dir() {
            return Err(Error::configuration(format!(
                "Output path is not a directory: {}",
                self.output_path.display()
            )));
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            log_level(self.verbose)
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}

impl CheckConfigArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose)
    }
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
