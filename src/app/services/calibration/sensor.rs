//! Applying sensor calibrations to extracted values

use super::{CalibrationKind, CalibrationLookup};
use crate::app::models::ColumnId;
use crate::app::services::sensor_values::DatasetSensorValues;
use tracing::debug;

/// Calibrate every numeric value of every column that has a polynomial
/// calibration in force at the value's time. Returns the number of values
/// changed.
pub fn apply_sensor_calibrations(
    values: &mut DatasetSensorValues,
    calibrations: &impl CalibrationLookup,
) -> usize {
    let mut calibrated = 0;
    let column_ids: Vec<ColumnId> = values.column_ids().collect();

    for column_id in column_ids {
        let target = column_id.to_string();
        values.update_column(column_id, |value| {
            let raw = value.double_value();
            if raw.is_nan() {
                return false;
            }
            match calibrations.most_recent_calibration(&target, value.time) {
                Some(calibration) if matches!(calibration.kind, CalibrationKind::Polynomial { .. }) => {
                    value.set_double_value(calibration.calibrate(raw));
                    calibrated += 1;
                    true
                }
                _ => false,
            }
        });
    }

    debug!("Applied sensor calibrations to {} values", calibrated);
    calibrated
}
