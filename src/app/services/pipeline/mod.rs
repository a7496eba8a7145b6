//! Dataset processing pipeline
//!
//! Runs one dataset through the complete pass: load and calibrate sensor
//! values, find run type periods and flushing windows, run sensor QC, locate
//! measurements, assemble their values, reduce them and run post-reduction
//! QC. One [`DatasetProcessor::process`] call owns its dataset; nothing is
//! shared between datasets.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use pco2_processor::ProcessorConfig;
//! use pco2_processor::app::services::pipeline::{DatasetInput, DatasetProcessor};
//!
//! # fn example(path: &std::path::Path) -> pco2_processor::Result<()> {
//! let config = ProcessorConfig::default();
//! let graph = config.graph()?;
//! let input = DatasetInput::from_path(path)?;
//!
//! let processed = DatasetProcessor::new(&config, &graph).process(input)?;
//! println!("{}", processed.stats.summary());
//! # Ok(())
//! # }
//! ```

use crate::app::models::records::{
    DataReductionRow, MeasurementRecord, MeasurementValueRecord, SensorValueRecord,
};
use crate::app::models::{DatasetId, SensorValue};
use crate::app::services::calibration::Calibration;
use crate::app::services::sensor_config::Instrument;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod processor;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use processor::{DatasetProcessor, ProcessedDataset};
pub use stats::DatasetStats;

/// Everything needed to process one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInput {
    pub dataset_id: DatasetId,
    pub name: String,
    pub instrument: Instrument,
    #[serde(default)]
    pub calibrations: Vec<Calibration>,
    /// Extracted readings, uncalibrated
    pub sensor_values: Vec<SensorValueRecord>,
}

impl DatasetInput {
    /// Read a dataset from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read dataset '{}'", path.display()), e)
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            Error::json(format!("Failed to parse dataset '{}'", path.display()), e)
        })
    }

    /// Sensor values of this dataset with their stored QC state
    pub fn sensor_values(&self) -> Result<Vec<SensorValue>> {
        self.sensor_values
            .iter()
            .cloned()
            .map(|record| {
                let mut value = SensorValue::try_from(record)?;
                value.dataset_id = self.dataset_id;
                Ok(value)
            })
            .collect()
    }
}

/// The stored results of one processing pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetOutput {
    pub dataset_id: DatasetId,
    pub name: String,
    pub measurements: Vec<MeasurementRecord>,
    pub measurement_values: Vec<MeasurementValueRecord>,
    pub data_reduction: Vec<DataReductionRow>,
    /// Sensor values whose QC changed, with their raw values
    pub sensor_values: Vec<SensorValueRecord>,
}
