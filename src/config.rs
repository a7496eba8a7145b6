//! Configuration management and validation.
//!
//! Provides the processing configuration: the sensor type graph, measurement
//! assembly options, QC routine assignments and export settings. Settings are
//! layered from built-in defaults, the user config file and an explicit
//! `--config` file, with CLI flags applied last by the caller.

use crate::app::services::qc::{
    DataReductionRoutineSettings, ParameterRangeRoutine, ROUTINE_NAMES, RoutineAssignment,
    build_routine,
};
use crate::app::services::sensor_config::{SensorType, SensorTypeGraph, default_sensor_types};
use crate::constants::parameters::DELTA_T;
use crate::constants::routines::DELTA_T_MESSAGE;
use crate::constants::sensor_types::XCO2;
use crate::constants::variables::UNDERWAY_MARINE_PCO2;
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_DELTA_T_BAD_LIMIT,
    DEFAULT_DELTA_T_QUESTIONABLE_LIMIT, DEFAULT_OUTLIER_STDEV_LIMIT,
};
use crate::{Error, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

// =============================================================================
// Export Settings
// =============================================================================

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    #[default]
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    #[serde(alias = "none")]
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Tabular export of data reduction records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Parquet,
    Csv,
    /// JSON output only
    None,
}

impl ExportFormat {
    /// File extension of the export, if one is written
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ExportFormat::Parquet => Some("parquet"),
            ExportFormat::Csv => Some("csv"),
            ExportFormat::None => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub compression: CompressionAlgorithm,
}

// =============================================================================
// Processing Settings
// =============================================================================

/// Measurement assembly options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Only good sensor values may contribute to measurement values
    pub good_flags_only: bool,
}

/// QC routines run before and after data reduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    pub routines: Vec<RoutineAssignment>,
    pub data_reduction_routines: Vec<DataReductionRoutineSettings>,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            routines: vec![RoutineAssignment::new(
                XCO2,
                "outlier",
                &[DEFAULT_OUTLIER_STDEV_LIMIT],
            )],
            data_reduction_routines: vec![DataReductionRoutineSettings::parameter_range(
                UNDERWAY_MARINE_PCO2,
                DELTA_T,
                DELTA_T_MESSAGE,
                DEFAULT_DELTA_T_QUESTIONABLE_LIMIT,
                DEFAULT_DELTA_T_BAD_LIMIT,
            )],
        }
    }
}

impl QcConfig {
    /// Post-reduction routines configured for a variable
    pub fn data_reduction_routines_for<'a>(
        &'a self,
        variable: &'a str,
    ) -> impl Iterator<Item = &'a DataReductionRoutineSettings> {
        self.data_reduction_routines
            .iter()
            .filter(move |settings| settings.variable == variable)
    }
}

/// Global configuration for pCO₂ processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Number of datasets processed concurrently
    pub workers: usize,

    /// Sensor type graph definitions
    pub sensor_types: Vec<SensorType>,

    pub assembly: AssemblyConfig,

    pub qc: QcConfig,

    pub export: ExportConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            sensor_types: default_sensor_types(),
            assembly: AssemblyConfig::default(),
            qc: QcConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl ProcessorConfig {
    /// Default config file location: `<config dir>/pco2_processor/config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error when the platform has no user config directory
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::configuration("Cannot determine user config directory"))
    }

    /// Load one TOML file over the built-in defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file '{}'", path.display()), e)
        })?;
        Self::from_toml(&contents, &path.display().to_string())
    }

    /// Parse TOML text; `source` names it in errors
    pub fn from_toml(contents: &str, source: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::ConfigFile {
            file: source.to_string(),
            source: e,
        })
    }

    /// Load with layered configuration (defaults -> user file -> explicit file)
    ///
    /// An explicit path must exist. The user file is used only when present.
    pub fn load_layered(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    path.display()
                )));
            }
            debug!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }

        match Self::default_config_path() {
            Ok(path) if path.exists() => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            _ => {
                debug!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Build and validate the sensor type graph
    pub fn graph(&self) -> Result<SensorTypeGraph> {
        SensorTypeGraph::new(self.sensor_types.clone())
    }

    /// Check the configuration before any dataset is processed
    ///
    /// # Errors
    ///
    /// Returns a configuration error for zero workers, an empty or invalid
    /// sensor type graph, a routine on an unknown sensor type, or a routine
    /// that cannot be built from its parameters
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        if self.sensor_types.is_empty() {
            return Err(Error::configuration("No sensor types configured"));
        }
        let graph = self.graph()?;

        for assignment in &self.qc.routines {
            if !ROUTINE_NAMES.contains(&assignment.routine.trim().to_lowercase().as_str()) {
                return Err(Error::configuration(format!(
                    "Unknown QC routine '{}'. Available routines: {}",
                    assignment.routine,
                    ROUTINE_NAMES.join(", ")
                )));
            }
            if !graph.contains(&assignment.sensor_type) {
                return Err(Error::configuration(format!(
                    "QC routine '{}' is assigned to unknown sensor type '{}'",
                    assignment.routine, assignment.sensor_type
                )));
            }
            build_routine(&assignment.routine, &assignment.parameters).map_err(|e| {
                Error::configuration(format!(
                    "QC routine '{}' on {}: {}",
                    assignment.routine, assignment.sensor_type, e
                ))
            })?;
        }

        for settings in &self.qc.data_reduction_routines {
            ParameterRangeRoutine::from_settings(settings).map_err(|e| {
                Error::configuration(format!(
                    "Data reduction routine for '{}' on {}: {}",
                    settings.variable, settings.parameter, e
                ))
            })?;
        }

        Ok(())
    }

    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Only use good sensor values when assembling measurements
    pub fn with_good_flags_only(mut self, good_flags_only: bool) -> Self {
        self.assembly.good_flags_only = good_flags_only;
        self
    }

    /// Replace the pre-reduction QC routines
    pub fn with_routines(mut self, routines: Vec<RoutineAssignment>) -> Self {
        self.qc.routines = routines;
        self
    }

    /// Replace the post-reduction QC routines
    pub fn with_data_reduction_routines(
        mut self,
        routines: Vec<DataReductionRoutineSettings>,
    ) -> Self {
        self.qc.data_reduction_routines = routines;
        self
    }

    /// Set the export format
    pub fn with_export_format(mut self, format: ExportFormat) -> Self {
        self.export.format = format;
        self
    }

    /// Set the parquet compression
    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.export.compression = compression;
        self
    }
}
