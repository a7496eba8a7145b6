//! Check-config command: load, validate and summarise the configuration

use super::shared::{ProcessingStats, setup_logging};
use crate::Result;
use crate::app::services::sensor_config::SensorTypeGraph;
use crate::cli::args::CheckConfigArgs;
use crate::config::ProcessorConfig;
use colored::*;
use tracing::info;

/// Validate the configuration and print the sensor type graph and QC routines
pub async fn run_check_config(args: CheckConfigArgs) -> Result<ProcessingStats> {
    setup_logging(args.get_log_level(), false)?;

    let config = ProcessorConfig::load_layered(args.config_file.as_deref())?;
    config.validate()?;
    let graph = config.graph()?;
    info!("Configuration is valid");

    println!("{}", "Configuration OK".bright_green().bold());
    for line in describe(&config, &graph) {
        println!("{}", line);
    }

    Ok(ProcessingStats::default())
}

/// Plain-text summary lines for the configuration
fn describe(config: &ProcessorConfig, graph: &SensorTypeGraph) -> Vec<String> {
    let mut lines = vec![
        format!("Workers: {}", config.workers),
        format!("Good flags only: {}", config.assembly.good_flags_only),
        format!(
            "Export: {:?} ({:?})",
            config.export.format, config.export.compression
        ),
        format!("Sensor types ({}):", graph.len()),
    ];

    for sensor_type in graph.iter() {
        let mut notes = Vec::new();
        if let Some(parent) = graph.parent(sensor_type) {
            notes.push(format!("child of {}", parent.name));
        }
        if graph.is_parent(sensor_type) {
            notes.push("parent".to_string());
        }
        if let Some(dependency) = graph.depends_on(sensor_type) {
            match &sensor_type.depends_question {
                Some(question) => {
                    notes.push(format!("depends on {} if \"{}\"", dependency.name, question))
                }
                None => notes.push(format!("depends on {}", dependency.name)),
            }
        }
        if sensor_type.run_type_aware {
            notes.push("run type aware".to_string());
        }
        if sensor_type.diagnostic {
            notes.push("diagnostic".to_string());
        }

        if notes.is_empty() {
            lines.push(format!("  {}", sensor_type.name));
        } else {
            lines.push(format!("  {} [{}]", sensor_type.name, notes.join(", ")));
        }
    }

    lines.push(format!("QC routines ({}):", config.qc.routines.len()));
    for routine in &config.qc.routines {
        lines.push(format!(
            "  {} on {} ({})",
            routine.routine,
            routine.sensor_type,
            routine.parameters.join(", ")
        ));
    }

    lines.push(format!(
        "Data reduction routines ({}):",
        config.qc.data_reduction_routines.len()
    ));
    for routine in &config.qc.data_reduction_routines {
        lines.push(format!(
            "  {} on {}.{}: {}",
            routine.routine, routine.variable, routine.parameter, routine.short_message
        ));
    }

    lines
}
