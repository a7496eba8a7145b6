//! Building measurement values from sensor values

use super::MeasurementValues;
use crate::app::models::{ColumnId, Measurement, MeasurementValue, ValueLink};
use crate::app::services::reduction::calculators;
use crate::app::services::sensor_config::{Instrument, InstrumentVariable, SensorType, SensorTypeGraph};
use crate::app::services::sensor_values::DatasetSensorValues;
use crate::constants::sensor_types::{
    AMBIENT_PRESSURE, EQUILIBRATOR_PRESSURE, EQUILIBRATOR_PRESSURE_ABSOLUTE,
    EQUILIBRATOR_PRESSURE_DIFFERENTIAL, X12CO2, X12CO2_PLUS_X13CO2, X13CO2, XCO2, XH2O,
};
use crate::constants::variables::UNDERWAY_ATMOSPHERIC_PCO2_12_13;
use crate::{Error, Result};
use tracing::debug;

/// CO₂ sensor types whose values can be dried with xH₂O
const DRYABLE_SENSOR_TYPES: &[&str] = &[XCO2, X12CO2, X13CO2, X12CO2_PLUS_X13CO2];

/// Variables whose CO₂ values are always dried
const ALWAYS_DRIED_VARIABLES: &[&str] = &[UNDERWAY_ATMOSPHERIC_PCO2_12_13];

/// Assembles measurement values for one dataset
pub struct MeasurementAssembler<'a> {
    graph: &'a SensorTypeGraph,
    instrument: &'a Instrument,
    sensor_values: &'a DatasetSensorValues,
    good_flags_only: bool,
}

impl<'a> MeasurementAssembler<'a> {
    pub fn new(
        graph: &'a SensorTypeGraph,
        instrument: &'a Instrument,
        sensor_values: &'a DatasetSensorValues,
    ) -> Self {
        Self {
            graph,
            instrument,
            sensor_values,
            good_flags_only: false,
        }
    }

    /// Only use good sensor values when searching around a measurement
    pub fn with_good_flags_only(mut self, good_flags_only: bool) -> Self {
        self.good_flags_only = good_flags_only;
        self
    }

    /// Assemble every listed sensor type for a measurement
    pub fn assemble_all(
        &self,
        measurement: &Measurement,
        variable: &InstrumentVariable,
        sensor_types: &[&str],
    ) -> Result<MeasurementValues> {
        let mut values = MeasurementValues::new(measurement.clone());
        for name in sensor_types {
            let sensor_type = self.graph.by_name(name)?;
            values.insert(self.assemble(measurement, sensor_type, variable)?);
        }
        Ok(values)
    }

    /// Assemble one sensor type for a measurement
    pub fn assemble(
        &self,
        measurement: &Measurement,
        sensor_type: &SensorType,
        variable: &InstrumentVariable,
    ) -> Result<MeasurementValue> {
        let mut value = if sensor_type.name == EQUILIBRATOR_PRESSURE {
            self.equilibrator_pressure(measurement)?
        } else if self.graph.is_parent(sensor_type) {
            let columns: Vec<ColumnId> = self
                .graph
                .children(sensor_type)
                .iter()
                .flat_map(|child| self.instrument.assignments.column_ids(&child.name))
                .collect();
            self.from_columns(measurement, &sensor_type.name, &columns)?
        } else {
            self.from_type(measurement, &sensor_type.name)?
        };

        if self.drying_required(sensor_type, variable) && !value.is_empty() {
            self.dry(measurement, &mut value)?;
        }

        Ok(value)
    }

    fn from_type(&self, measurement: &Measurement, sensor_type: &str) -> Result<MeasurementValue> {
        let columns = self.instrument.assignments.column_ids(sensor_type);
        self.from_columns(measurement, sensor_type, &columns)
    }

    /// Mean over the columns that have a usable value at the measurement time
    fn from_columns(
        &self,
        measurement: &Measurement,
        sensor_type: &str,
        columns: &[ColumnId],
    ) -> Result<MeasurementValue> {
        let mut result = MeasurementValue::empty(measurement.id, sensor_type);
        let mut contributions = Vec::with_capacity(columns.len());

        for column_id in columns {
            let Some(index) = self.sensor_values.column(*column_id) else {
                continue;
            };
            let link = index.populate_measurement_value(*column_id, measurement.time, self.good_flags_only)?;
            if link.is_empty() {
                continue;
            }

            let column_value = self.link_value(&link, measurement)?;
            for id in link.sensor_value_ids() {
                if let Some(sensor_value) = self.sensor_values.get(id) {
                    result.add_qc(sensor_value.effective_flag(), sensor_value.effective_messages());
                }
            }
            if !column_value.is_nan() {
                contributions.push(column_value);
            }
            result.links.push(link);
        }

        result.member_count = contributions.len();
        result.calculated_value = calculators::mean(contributions);
        Ok(result)
    }

    /// The value of one column: the prior value, or an interpolation by time
    fn link_value(&self, link: &ValueLink, measurement: &Measurement) -> Result<f64> {
        let lookup = |id| {
            self.sensor_values
                .get(id)
                .ok_or_else(|| Error::data_set(format!("Sensor value {} not found", id)))
        };

        let Some(prior_id) = link.prior else {
            return Ok(f64::NAN);
        };
        let prior = lookup(prior_id)?;

        match link.post {
            None => Ok(prior.double_value()),
            Some(post_id) => {
                let post = lookup(post_id)?;
                Ok(calculators::interpolate(
                    prior.time.timestamp_millis() as f64,
                    prior.double_value(),
                    post.time.timestamp_millis() as f64,
                    post.double_value(),
                    measurement.time.timestamp_millis() as f64,
                ))
            }
        }
    }

    /// Absolute pressure sensors if assigned, otherwise ambient plus differential
    fn equilibrator_pressure(&self, measurement: &Measurement) -> Result<MeasurementValue> {
        let assignments = &self.instrument.assignments;

        if assignments.is_assigned(EQUILIBRATOR_PRESSURE_ABSOLUTE) {
            let mut value = self.from_type(measurement, EQUILIBRATOR_PRESSURE_ABSOLUTE)?;
            value.sensor_type = EQUILIBRATOR_PRESSURE.to_string();
            return Ok(value);
        }

        let mut differential = self.from_type(measurement, EQUILIBRATOR_PRESSURE_DIFFERENTIAL)?;
        differential.sensor_type = EQUILIBRATOR_PRESSURE.to_string();
        if differential.is_empty() {
            return Ok(differential);
        }

        let ambient = self.from_type(measurement, AMBIENT_PRESSURE)?;
        if ambient.is_empty() {
            debug!(
                "No ambient pressure for measurement {}; equilibrator pressure unavailable",
                measurement.id
            );
            return Ok(MeasurementValue::empty(measurement.id, EQUILIBRATOR_PRESSURE));
        }

        differential.calculated_value += ambient.calculated_value;
        differential.add_qc(ambient.qc_flag, ambient.qc_messages.clone());
        differential.links.extend(ambient.links);
        Ok(differential)
    }

    fn drying_required(&self, sensor_type: &SensorType, variable: &InstrumentVariable) -> bool {
        if !DRYABLE_SENSOR_TYPES.contains(&sensor_type.name.as_str()) {
            return false;
        }
        if ALWAYS_DRIED_VARIABLES.contains(&variable.name.as_str()) {
            return true;
        }
        sensor_type.depends_question.is_some()
            && self
                .instrument
                .assignments
                .depends_question_answered(&sensor_type.name)
    }

    /// Convert a wet CO₂ mole fraction to dry using the xH₂O at the same time
    fn dry(&self, measurement: &Measurement, value: &mut MeasurementValue) -> Result<()> {
        let xh2o = self.from_type(measurement, XH2O)?;

        value.calculated_value = calculators::dry_xco2(value.calculated_value, xh2o.calculated_value);
        value.add_qc(xh2o.qc_flag, xh2o.qc_messages.clone());
        value
            .supporting_ids
            .extend(xh2o.links.iter().flat_map(|link| link.sensor_value_ids()));
        Ok(())
    }
}
