//! Sensor value QC routine interface and registry

use super::outlier::OutlierRoutine;
use crate::app::models::{RoutineFlag, SensorValue, SensorValueId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A flag raised by a routine for one sensor value
pub type RoutineOutcome = (SensorValueId, RoutineFlag);

/// Routine names accepted in configuration
pub const ROUTINE_NAMES: &[&str] = &["outlier"];

/// A QC routine over one group of sensor values from one column
pub trait AutoQcRoutine: Send + Sync {
    /// Identifier stored with each flag
    fn name(&self) -> &'static str;

    /// Flags for the values that fail; NaN values are never flagged
    fn evaluate(&self, values: &[&SensorValue]) -> Vec<RoutineOutcome>;
}

/// A routine configured for a sensor type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineAssignment {
    pub sensor_type: String,
    pub routine: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl RoutineAssignment {
    pub fn new(sensor_type: impl Into<String>, routine: impl Into<String>, parameters: &[&str]) -> Self {
        Self {
            sensor_type: sensor_type.into(),
            routine: routine.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Build a routine from its configured name and parameters
///
/// # Errors
///
/// Returns [`Error::Routine`] for an unknown name or invalid parameters
pub fn build_routine(name: &str, parameters: &[String]) -> Result<Box<dyn AutoQcRoutine>> {
    match name.trim().to_lowercase().as_str() {
        "outlier" => Ok(Box::new(OutlierRoutine::from_parameters(parameters)?)),
        _ => Err(Error::routine(name, "Unknown QC routine")),
    }
}
