//! Tests for QC routines and their orchestration


use crate::app::models::SensorValue;

pub use crate::app::services::sensor_config::tests::{built_in_graph, marine_instrument};
pub use crate::app::services::sensor_values::tests::{at, flagged, value};

/// Values of one column at one-minute spacing, ids counting from `first_id`
pub fn series(first_id: i64, column_id: i64, raw: &[f64]) -> Vec<SensorValue> {
    raw.iter()
        .enumerate()
        .map(|(i, v)| value(first_id + i as i64, column_id, i as i64 * 60, &v.to_string()))
        .collect()
}
