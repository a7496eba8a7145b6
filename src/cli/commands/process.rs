//! Process command implementation for the pCO₂ processor CLI
//!
//! Discovers dataset files, processes each one on a blocking worker and
//! writes its outputs. Datasets share nothing, so they run concurrently up to
//! the configured worker count.

use super::shared::{
    ProcessingStats, create_progress_bar, discover_inputs, is_critical_error, load_configuration,
    output_file, setup_logging,
};
use crate::app::services::export::{reduction_frame, stage_frame, stage_json};
use crate::app::services::pipeline::{DatasetInput, DatasetProcessor, DatasetStats};
use crate::app::services::sensor_config::SensorTypeGraph;
use crate::cli::args::{OutputFormat, ProcessArgs};
use crate::config::ProcessorConfig;
use crate::constants::REDUCED_OUTPUT_SUFFIX;
use crate::{Error, Result};
use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::HumanDuration;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Result of processing and writing one dataset file
#[derive(Debug)]
struct FileOutcome {
    stats: DatasetStats,
    outputs: Vec<(String, u64)>,
}

/// Process command runner
///
/// 1. Set up logging and configuration
/// 2. Discover dataset files
/// 3. Process datasets concurrently with progress reporting
/// 4. Generate summary statistics
pub async fn run_process(
    args: ProcessArgs,
    cancellation_token: CancellationToken,
) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;

    info!("Starting pCO₂ processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);
    let graph = config.graph()?;

    let files = discover_inputs(&args.inputs)?;
    info!("Found {} dataset files", files.len());

    if args.dry_run {
        return run_dry_run(&config, &files, &args.output_path);
    }

    std::fs::create_dir_all(&args.output_path).map_err(|e| {
        Error::io(
            format!(
                "Failed to create output directory '{}'",
                args.output_path.display()
            ),
            e,
        )
    })?;

    if args.output_format == OutputFormat::Human && !args.quiet {
        println!(
            "{} {} datasets with {} workers",
            "Processing".bright_green().bold(),
            files.len().to_string().bright_white().bold(),
            config.workers
        );
    }

    let mut stats = ProcessingStats {
        datasets_found: files.len(),
        ..Default::default()
    };

    let progress_bar = args
        .show_progress()
        .then(|| create_progress_bar(files.len() as u64, "Starting..."));

    let workers = config.workers;
    let config = Arc::new(config);
    let graph = Arc::new(graph);
    let output_dir = Arc::new(args.output_path.clone());

    let mut results = stream::iter(files)
        .map(|path| {
            let config = Arc::clone(&config);
            let graph = Arc::clone(&graph);
            let output_dir = Arc::clone(&output_dir);
            let token = cancellation_token.clone();
            async move {
                let task_path = path.clone();
                let result = task::spawn_blocking(move || {
                    process_file(&task_path, &config, &graph, &output_dir, &token)
                })
                .await
                .unwrap_or_else(|e| {
                    Err(Error::data_set(format!(
                        "Worker for '{}' failed: {}",
                        path.display(),
                        e
                    )))
                });
                (path, result)
            }
        })
        .buffer_unordered(workers);

    while let Some((path, result)) = results.next().await {
        if let Some(pb) = &progress_bar {
            pb.inc(1);
            if let Some(name) = path.file_name() {
                pb.set_message(format!("Finished: {}", name.to_string_lossy()));
            }
        }

        match result {
            Ok(outcome) => {
                debug!("{}: {}", path.display(), outcome.stats.summary());
                stats.datasets_processed += 1;
                stats.sensor_values += outcome.stats.sensor_values;
                stats.measurements += outcome.stats.measurements;
                stats.records += outcome.stats.records;
                stats.records_flagged += outcome.stats.records_flagged;
                stats.sensor_values_written += outcome.stats.pending_writes;
                stats.output_sizes.extend(outcome.outputs);
            }
            Err(e) if is_critical_error(&e) => {
                if let Some(pb) = &progress_bar {
                    pb.abandon_with_message("Aborted");
                }
                return Err(e);
            }
            Err(e) => {
                error!("Failed to process {}: {:#}", path.display(), e);
                stats.datasets_failed += 1;
            }
        }
    }

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Processing complete");
    }

    stats.output_sizes.sort();
    stats.processing_time = start_time.elapsed();

    generate_final_report(&args, &stats)?;

    Ok(stats)
}

/// Process one dataset file and write its outputs
///
/// Nothing is written once cancellation has been requested.
fn process_file(
    path: &Path,
    config: &ProcessorConfig,
    graph: &SensorTypeGraph,
    output_dir: &Path,
    cancellation_token: &CancellationToken,
) -> Result<FileOutcome> {
    if cancellation_token.is_cancelled() {
        return Err(Error::processing_interrupted("Cancelled before start"));
    }

    let input = DatasetInput::from_path(path)?;
    info!("Processing dataset '{}' from {}", input.name, path.display());

    let processed = DatasetProcessor::new(config, graph).process(input)?;

    if cancellation_token.is_cancelled() {
        warn!("Discarding results for {} after cancellation", path.display());
        return Err(Error::processing_interrupted(format!(
            "Results for '{}' not written",
            path.display()
        )));
    }

    // Stage every output before any is moved into place
    let json_path = output_file(output_dir, path, REDUCED_OUTPUT_SUFFIX);
    let mut staged = vec![stage_json(&processed.output, &json_path)?];

    if let Some(extension) = config.export.format.extension() {
        let export_path = output_file(output_dir, path, &format!("reduced.{}", extension));
        let mut frame = reduction_frame(&processed.measurements, &processed.records)?;
        staged.push(stage_frame(
            &mut frame,
            &export_path,
            config.export.format,
            config.export.compression,
        )?);
    }

    // The JSON goes last so it only appears once its export is in place
    let mut outputs = Vec::with_capacity(staged.len());
    for file in staged.into_iter().rev() {
        let name = file.path().display().to_string();
        let size = file.commit()?;
        outputs.push((name, size));
    }

    Ok(FileOutcome {
        stats: processed.stats,
        outputs,
    })
}

/// Perform a dry run showing what would be processed
fn run_dry_run(
    config: &ProcessorConfig,
    files: &[PathBuf],
    output_dir: &Path,
) -> Result<ProcessingStats> {
    info!("Performing dry run - no files will be created");

    for file in files {
        info!("Would process: {}", file.display());
        info!(
            "Would create: {}",
            output_file(output_dir, file, REDUCED_OUTPUT_SUFFIX).display()
        );
        if let Some(extension) = config.export.format.extension() {
            info!(
                "Would create: {}",
                output_file(output_dir, file, &format!("reduced.{}", extension)).display()
            );
        }
    }

    info!("Dry run complete: {} datasets would be processed", files.len());

    Ok(ProcessingStats {
        datasets_found: files.len(),
        ..Default::default()
    })
}

/// Generate final processing report
fn generate_final_report(args: &ProcessArgs, stats: &ProcessingStats) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if !args.quiet {
                generate_human_report(stats);
            }
            Ok(())
        }
        OutputFormat::Json => generate_json_report(stats),
    }
}

/// Generate human-readable report
fn generate_human_report(stats: &ProcessingStats) {
    let duration = HumanDuration(stats.processing_time);
    let total_size = ProcessingStats::format_size(stats.total_output_size());

    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Datasets processed:".bright_cyan(),
        stats.datasets_processed.to_string().bright_white().bold()
    );
    if stats.datasets_failed > 0 {
        println!(
            "  {} {}",
            "Datasets failed:".bright_red(),
            stats.datasets_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Sensor values:".bright_cyan(),
        stats.sensor_values.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Measurements:".bright_cyan(),
        stats.measurements.to_string().bright_white()
    );
    println!(
        "  {} {} ({} flagged)",
        "Records:".bright_cyan(),
        stats.records.to_string().bright_white().bold(),
        stats.records_flagged
    );
    println!(
        "  {} {}",
        "Sensor values written:".bright_cyan(),
        stats.sensor_values_written.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Total output size:".bright_cyan(),
        total_size.bright_white()
    );
    println!("  {} {}", "Time elapsed:".bright_cyan(), duration);

    if !stats.output_sizes.is_empty() {
        println!("\n{}", "Output Files".bright_green().bold());
        for (filename, size) in &stats.output_sizes {
            println!("  {}: {}", filename, ProcessingStats::format_size(*size));
        }
    }
    println!();
}

/// Generate JSON report for machine consumption
fn generate_json_report(stats: &ProcessingStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)
        .map_err(|e| Error::json("Failed to encode processing report", e))?;
    println!("{}", json);
    Ok(())
}
