//! Measurement location and measurement value assembly
//!
//! Measurements are the points in time at which data reduction runs. For
//! each measurement and each sensor type a reducer needs, the assembler
//! builds a [`MeasurementValue`] from the sensor values around that time.

use crate::app::models::{Measurement, MeasurementValue, SensorValueId};
use std::collections::BTreeMap;

pub mod assembler;
pub mod locator;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use assembler::MeasurementAssembler;
pub use locator::{LocatedMeasurements, MeasurementLocator};

/// The assembled measurement values of one measurement, by sensor type name
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementValues {
    pub measurement: Measurement,
    values: BTreeMap<String, MeasurementValue>,
}

impl MeasurementValues {
    pub fn new(measurement: Measurement) -> Self {
        Self {
            measurement,
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, value: MeasurementValue) {
        self.values.insert(value.sensor_type.clone(), value);
    }

    /// The value for a sensor type, `None` if absent or without contributors
    pub fn get(&self, sensor_type: &str) -> Option<&MeasurementValue> {
        self.values.get(sensor_type).filter(|v| !v.is_empty())
    }

    /// Calculated value of a sensor type, NaN when absent
    pub fn value(&self, sensor_type: &str) -> f64 {
        self.get(sensor_type)
            .map(|v| v.calculated_value)
            .unwrap_or(f64::NAN)
    }

    /// Names from `required` with no usable value, in the order given
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| self.get(name).is_none())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeasurementValue> {
        self.values.values()
    }

    /// Every sensor value behind every measurement value, without repeats
    pub fn sensor_value_ids(&self) -> Vec<SensorValueId> {
        let mut ids: Vec<SensorValueId> = self
            .values
            .values()
            .flat_map(|v| v.sensor_value_ids())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
