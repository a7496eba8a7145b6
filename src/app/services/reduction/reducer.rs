//! The reducer interface and the shared reduction policy

use crate::Result;
use crate::app::models::{CalculationParameter, DataReductionRecord, Flag};
use crate::app::services::calibration::CalibrationLookup;
use crate::app::services::measurement::MeasurementValues;
use crate::app::services::sensor_config::InstrumentVariable;
use tracing::{debug, warn};

/// Calculates one variable's parameters from assembled measurement values
pub trait DataReducer: Send + Sync {
    /// The instrument variable this reducer was built for
    fn variable(&self) -> &InstrumentVariable;

    /// Sensor types the calculation reads, before dependency resolution
    fn required_sensor_types(&self) -> Vec<&'static str>;

    /// Sensor types whose readings define when measurements are taken
    fn core_sensor_types(&self) -> Vec<&'static str>;

    /// Output parameters in record order
    fn calculation_parameters(&self) -> &'static [CalculationParameter];

    /// Fill `record` from `values`; every required value is present
    fn calculate(
        &self,
        values: &MeasurementValues,
        calibrations: &dyn CalibrationLookup,
        record: &mut DataReductionRecord,
    ) -> Result<()>;

    fn parameter_names(&self) -> Vec<&'static str> {
        self.calculation_parameters().iter().map(|p| p.name).collect()
    }
}

/// Reduce one measurement
///
/// Missing inputs give an all-NaN record flagged `NoQc` with one message per
/// missing sensor type. A failed calculation is logged and degraded the same
/// way with the error as its message. Otherwise the record takes the worst
/// flag of the measurement values it consumed.
pub fn reduce(
    reducer: &dyn DataReducer,
    values: &MeasurementValues,
    calibrations: &dyn CalibrationLookup,
) -> DataReductionRecord {
    let variable = reducer.variable();
    let mut record = DataReductionRecord::new(
        values.measurement.id,
        variable.id,
        reducer.parameter_names(),
    );

    let required = reducer.required_sensor_types();
    let missing = values.missing(&required);
    if !missing.is_empty() {
        debug!(
            "Measurement {} of '{}' is missing {}",
            values.measurement.id,
            variable.name,
            missing.join(", ")
        );
        record.override_qc(
            Flag::NoQc,
            missing.iter().map(|name| format!("Missing {}", name)).collect(),
        );
        return record;
    }

    if let Err(error) = reducer.calculate(values, calibrations, &mut record) {
        warn!(
            "Data reduction failed for measurement {} of '{}': {}",
            values.measurement.id, variable.name, error
        );
        record.set_all_nan();
        record.override_qc(Flag::NoQc, vec![error.to_string()]);
        return record;
    }

    for name in &required {
        if let Some(value) = values.get(name) {
            record.set_qc(value.qc_flag, value.qc_messages.iter().cloned());
        }
    }

    record
}
