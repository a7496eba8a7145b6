//! Tests for measurement location and assembly

pub mod assembler_tests;
pub mod locator_tests;

use crate::app::models::{Measurement, SensorValue};
use crate::app::services::sensor_config::tests::marine_instrument;
use crate::app::services::sensor_config::{Instrument, SensorTypeGraph};
use crate::app::services::sensor_values::DatasetSensorValues;
use crate::app::services::sensor_values::tests::at;

pub use crate::app::services::sensor_config::tests::built_in_graph;
pub use crate::app::services::sensor_values::tests::{flagged, value};

/// Graph, marine instrument and a dataset built from `values`
pub fn fixture(values: Vec<SensorValue>) -> (SensorTypeGraph, Instrument, DatasetSensorValues) {
    (
        built_in_graph(),
        marine_instrument(),
        DatasetSensorValues::from_values(1, values).unwrap(),
    )
}

/// A measurement `seconds` after the base time
pub fn measurement_at(id: i64, seconds: i64) -> Measurement {
    Measurement::new(id, 1, at(seconds), Some("EQU".to_string()))
}
