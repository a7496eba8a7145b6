//! Shared components for CLI commands
//!
//! This module contains common types, utilities, and functions used across
//! multiple CLI command implementations.

use crate::cli::args::ProcessArgs;
use crate::config::{CompressionAlgorithm, ExportFormat, ProcessorConfig};
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Processing statistics for reporting across all commands
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingStats {
    /// Number of datasets found
    pub datasets_found: usize,
    /// Number of datasets processed and written
    pub datasets_processed: usize,
    /// Number of datasets that failed
    pub datasets_failed: usize,
    /// Number of sensor values read
    pub sensor_values: usize,
    /// Number of measurements located
    pub measurements: usize,
    /// Number of data reduction records produced
    pub records: usize,
    /// Number of records with a QC flag worse than good
    pub records_flagged: usize,
    /// Number of sensor values changed by QC and written back
    pub sensor_values_written: usize,
    /// Total processing time
    #[serde(serialize_with = "serialize_duration_secs")]
    pub processing_time: std::time::Duration,
    /// Output file sizes in bytes
    pub output_sizes: Vec<(String, u64)>,
}

fn serialize_duration_secs<S: serde::Serializer>(
    duration: &std::time::Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl ProcessingStats {
    /// Calculate total output size in bytes
    pub fn total_output_size(&self) -> u64 {
        self.output_sizes.iter().map(|(_, size)| size).sum()
    }

    /// Format output size in human-readable format
    pub fn format_size(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

/// Set up structured logging at the given level
///
/// `RUST_LOG` takes precedence over the CLI level when set.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pco2_processor={}", log_level)));

    let result = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| Error::configuration(format!("Failed to initialise logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using the layered approach (defaults -> file -> args)
pub fn load_configuration(args: &ProcessArgs) -> Result<ProcessorConfig> {
    info!("Loading configuration");

    let mut config = ProcessorConfig::load_layered(args.config_file.as_deref())?;
    apply_cli_overrides(&mut config, args);
    config.validate()?;

    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut ProcessorConfig, args: &ProcessArgs) {
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if args.good_flags_only {
        config.assembly.good_flags_only = true;
    }
    if let Some(format) = args.export_format {
        config.export.format = ExportFormat::from(format);
    }
    if let Some(compression) = args.compression {
        config.export.compression = CompressionAlgorithm::from(compression);
    }
}

/// Resolve command-line inputs to a sorted, de-duplicated list of dataset files
///
/// Inputs that exist are taken as files, or walked recursively for `*.json`
/// when they are directories. Anything else is expanded as a glob pattern.
pub fn discover_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    discovery::discover(inputs).map_err(|e| Error::configuration(format!("{:#}", e)))
}

mod discovery {
    use anyhow::{Context, Result};
    use std::path::{Path, PathBuf};
    use walkdir::WalkDir;

    pub fn discover(inputs: &[String]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in inputs {
            let path = Path::new(input);
            if path.is_dir() {
                files.extend(walk_json(path)?);
            } else if path.is_file() {
                files.push(path.to_path_buf());
            } else {
                let matches = expand_glob(input)?;
                if matches.is_empty() {
                    anyhow::bail!("No dataset files match '{}'", input);
                }
                files.extend(matches);
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    fn walk_json(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry =
                entry.with_context(|| format!("Failed to read directory {}", dir.display()))?;
            let path = entry.path();
            if path.is_file() && is_dataset_file(path) {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }

    fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in
            glob::glob(pattern).with_context(|| format!("Invalid glob pattern '{}'", pattern))?
        {
            let path = entry.with_context(|| format!("Failed to read match of '{}'", pattern))?;
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// JSON files other than previously written outputs
    fn is_dataset_file(path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        name.ends_with(".json") && !name.ends_with(crate::constants::REDUCED_OUTPUT_SUFFIX)
    }
}

/// Output path for a dataset file: `<output>/<stem>.<suffix>`
pub fn output_file(output_dir: &Path, input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    output_dir.join(format!("{}.{}", stem, suffix))
}

/// Check if an error is critical enough to stop processing
pub fn is_critical_error(error: &Error) -> bool {
    matches!(
        error,
        Error::Configuration { .. } | Error::ConfigFile { .. } | Error::ProcessingInterrupted { .. }
    )
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
