//! Tests for calculators, dependency resolution and reducers


use crate::app::models::{Flag, Measurement, MeasurementValue, ValueLink};
use crate::app::services::measurement::MeasurementValues;
use chrono::{TimeZone, Utc};

pub fn measurement() -> Measurement {
    Measurement::new(
        1,
        1,
        Utc.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap(),
        None,
    )
}

/// A single-contributor measurement value with the given flag
pub fn measurement_value(
    sensor_type: &str,
    value: f64,
    sensor_value_id: i64,
    flag: Flag,
    message: Option<&str>,
) -> MeasurementValue {
    let mut result = MeasurementValue::empty(1, sensor_type);
    result.links.push(ValueLink::new(sensor_value_id, Some(sensor_value_id), None));
    result.calculated_value = value;
    result.member_count = 1;
    result.add_qc(flag, message.map(str::to_string));
    result
}

/// Good measurement values, sensor value ids counting from 1
pub fn values_of(entries: &[(&str, f64)]) -> MeasurementValues {
    let mut values = MeasurementValues::new(measurement());
    for (i, (sensor_type, value)) in entries.iter().enumerate() {
        values.insert(measurement_value(sensor_type, *value, i as i64 + 1, Flag::Good, None));
    }
    values
}
