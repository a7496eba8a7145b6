//! Measurement location
//!
//! A measurement is created for every distinct time at which a variable's
//! core sensor columns reported. Measurements shared by several variables
//! are created once.

use crate::app::models::{ColumnId, DatasetId, Measurement, MeasurementId, VariableId};
use crate::app::services::sensor_config::InstrumentVariable;
use crate::app::services::sensor_values::{DatasetSensorValues, RunTypeTracker};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// The measurements of a dataset and which variables use them
#[derive(Debug, Clone, Default)]
pub struct LocatedMeasurements {
    pub measurements: Vec<Measurement>,
    /// Positions into `measurements` per variable, in time order
    pub by_variable: BTreeMap<VariableId, Vec<usize>>,
}

impl LocatedMeasurements {
    pub fn for_variable(&self, variable_id: VariableId) -> impl Iterator<Item = &Measurement> {
        self.by_variable
            .get(&variable_id)
            .into_iter()
            .flatten()
            .map(|position| &self.measurements[*position])
    }

    pub fn get(&self, id: MeasurementId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

pub struct MeasurementLocator<'a> {
    sensor_values: &'a DatasetSensorValues,
    tracker: &'a RunTypeTracker,
}

impl<'a> MeasurementLocator<'a> {
    pub fn new(sensor_values: &'a DatasetSensorValues, tracker: &'a RunTypeTracker) -> Self {
        Self {
            sensor_values,
            tracker,
        }
    }

    /// Locate measurements for each variable from its core columns
    ///
    /// Ids run from 1 in time order. A measurement's run type is that of
    /// the enclosing period, or the next period when it falls in a gap.
    /// Variables that list measurement run types only receive measurements
    /// of those run types.
    pub fn locate(
        &self,
        dataset_id: DatasetId,
        variables: &[(&InstrumentVariable, Vec<ColumnId>)],
    ) -> LocatedMeasurements {
        let variable_times: Vec<(VariableId, Vec<DateTime<Utc>>)> = variables
            .iter()
            .map(|(variable, columns)| (variable.id, self.sensor_values.times(columns)))
            .collect();

        let all_times: BTreeSet<DateTime<Utc>> = variable_times
            .iter()
            .flat_map(|(_, times)| times.iter().copied())
            .collect();

        let measurements: Vec<Measurement> = all_times
            .iter()
            .enumerate()
            .map(|(position, time)| {
                let run_type = self
                    .tracker
                    .period_for(*time)
                    .map(|period| period.run_type.clone());
                Measurement::new(position as MeasurementId + 1, dataset_id, *time, run_type)
            })
            .collect();

        let positions: BTreeMap<DateTime<Utc>, usize> = measurements
            .iter()
            .enumerate()
            .map(|(position, m)| (m.time, position))
            .collect();

        let mut by_variable = BTreeMap::new();
        for ((variable, _), (variable_id, times)) in variables.iter().zip(&variable_times) {
            let selected: Vec<usize> = times
                .iter()
                .filter_map(|time| positions.get(time).copied())
                .filter(|position| {
                    variable.measures_run_type(measurements[*position].run_type.as_deref())
                })
                .collect();

            debug!(
                "Variable '{}' has {} of {} candidate measurements",
                variable.name,
                selected.len(),
                times.len()
            );
            by_variable.insert(*variable_id, selected);
        }

        LocatedMeasurements {
            measurements,
            by_variable,
        }
    }
}
