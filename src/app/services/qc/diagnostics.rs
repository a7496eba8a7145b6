//! Diagnostic sensor range checks

use crate::app::models::{ColumnId, Flag, RoutineFlag, SensorValueId};
use crate::app::services::sensor_config::{Instrument, SensorTypeGraph};
use crate::app::services::sensor_values::{DatasetSensorValues, RunTypeTracker};
use crate::constants::routines::{DIAGNOSTICS, OUT_OF_RANGE_MESSAGE};
use tracing::debug;

/// Flag diagnostic readings outside their instrument range and cascade
///
/// An out-of-range reading gets a `Bad` automatic flag. The same flag goes
/// to readings at the same time in the columns the range lists for the run
/// type in force. Only ranges on columns assigned to diagnostic sensor types
/// are checked. Returns the number of values flagged.
pub fn apply_diagnostic_qc(
    values: &mut DatasetSensorValues,
    graph: &SensorTypeGraph,
    instrument: &Instrument,
    tracker: &RunTypeTracker,
) -> usize {
    let diagnostic_columns: Vec<ColumnId> = instrument
        .assignments
        .diagnostic_assignments(graph)
        .map(|a| a.column_id)
        .collect();

    let mut outcomes: Vec<(SensorValueId, RoutineFlag)> = Vec::new();

    for range in &instrument.diagnostic_ranges {
        if !diagnostic_columns.contains(&range.column_id) {
            continue;
        }
        let Some(index) = values.column(range.column_id) else {
            continue;
        };

        for value in index.iter() {
            let reading = value.double_value();
            if reading.is_nan() || range.contains(reading) {
                continue;
            }

            let flag = RoutineFlag::new(
                DIAGNOSTICS,
                Flag::Bad,
                OUT_OF_RANGE_MESSAGE,
                range.range_description(),
                reading.to_string(),
            );

            let run_type = tracker.period_for(value.time).map(|p| p.run_type.as_str());
            let cascaded = run_type
                .map(|r| range.affected(r))
                .unwrap_or(&[])
                .iter()
                .filter_map(|column_id| values.column(*column_id))
                .flat_map(|affected| affected.values_at(value.time))
                .map(|affected| (affected.id, flag.clone()));

            outcomes.extend(cascaded);
            outcomes.push((value.id, flag));
        }
    }

    let mut flagged = 0;
    for (id, flag) in outcomes {
        if let Some(value) = values.get_mut(id) {
            value.add_auto_qc_flag(flag);
            flagged += 1;
        }
    }

    debug!("Diagnostics flagged {} sensor values", flagged);
    flagged
}
