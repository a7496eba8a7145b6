//! Running the configured QC routines over a dataset

use super::diagnostics::apply_diagnostic_qc;
use super::routine::{RoutineAssignment, build_routine};
use super::long_message;
use crate::Result;
use crate::app::models::{Flag, SensorValue};
use crate::app::services::sensor_config::{Instrument, SensorTypeGraph};
use crate::app::services::sensor_values::{DatasetSensorValues, RunTypeTracker};
use tracing::{debug, error, info};

/// Counts from one pre-reduction QC pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QcSummary {
    pub routines_run: usize,
    pub routines_failed: usize,
    pub values_flagged: usize,
    pub diagnostic_flags: usize,
}

/// Runs pre-reduction QC for one dataset
pub struct QcRunner<'a> {
    graph: &'a SensorTypeGraph,
    instrument: &'a Instrument,
    tracker: &'a RunTypeTracker,
}

impl<'a> QcRunner<'a> {
    pub fn new(
        graph: &'a SensorTypeGraph,
        instrument: &'a Instrument,
        tracker: &'a RunTypeTracker,
    ) -> Self {
        Self {
            graph,
            instrument,
            tracker,
        }
    }

    /// Clear automatic QC, run every configured routine, then diagnostics
    ///
    /// Each routine runs on its own: a misconfigured routine is logged and
    /// counted and the rest still run.
    pub fn run(&self, values: &mut DatasetSensorValues, routines: &[RoutineAssignment]) -> QcSummary {
        let mut summary = QcSummary::default();
        values.clear_automatic_qc();

        for assignment in routines {
            match self.run_routine(values, assignment) {
                Ok(flagged) => {
                    summary.routines_run += 1;
                    summary.values_flagged += flagged;
                }
                Err(e) => {
                    error!(
                        "QC routine '{}' on {} skipped: {}",
                        assignment.routine, assignment.sensor_type, e
                    );
                    summary.routines_failed += 1;
                }
            }
        }

        summary.diagnostic_flags = apply_diagnostic_qc(values, self.graph, self.instrument, self.tracker);

        info!(
            "Sensor QC: {} routines run, {} failed, {} values flagged, {} diagnostic flags",
            summary.routines_run, summary.routines_failed, summary.values_flagged, summary.diagnostic_flags
        );
        summary
    }

    /// Run one routine over every column of its sensor type
    ///
    /// # Errors
    ///
    /// Returns an error if the routine cannot be built or its sensor type is unknown
    pub fn run_routine(&self, values: &mut DatasetSensorValues, assignment: &RoutineAssignment) -> Result<usize> {
        let routine = build_routine(&assignment.routine, &assignment.parameters)?;
        let sensor_type = self.graph.by_name(&assignment.sensor_type)?;
        let run_type_aware = sensor_type.run_type_aware && !self.tracker.is_empty();

        let mut outcomes = Vec::new();
        for column_id in self.instrument.assignments.column_ids(&sensor_type.name) {
            let Some(index) = values.column(column_id) else {
                continue;
            };
            let column = index.values();

            if run_type_aware {
                for positions in self.tracker.group_by_run_type(column).values() {
                    let group: Vec<&SensorValue> = positions
                        .iter()
                        .map(|p| &column[*p])
                        .filter(|v| v.user_qc_flag != Flag::Flushing)
                        .collect();
                    outcomes.extend(routine.evaluate(&group));
                }
            } else {
                let group: Vec<&SensorValue> = column
                    .iter()
                    .filter(|v| v.user_qc_flag != Flag::Flushing)
                    .collect();
                outcomes.extend(routine.evaluate(&group));
            }
        }

        let flagged = outcomes.len();
        for (id, flag) in outcomes {
            debug!("{} flagged value {}: {}", routine.name(), id, long_message(&flag));
            if let Some(value) = values.get_mut(id) {
                value.add_auto_qc_flag(flag);
            }
        }
        Ok(flagged)
    }
}
