//! Tests for the dataset processing pipeline

pub mod processor_tests;

use crate::app::models::records::SensorValueRecord;
use crate::app::services::pipeline::DatasetInput;
use crate::app::services::sensor_config::Instrument;
use crate::app::services::sensor_config::tests::marine_instrument;
use crate::app::services::sensor_values::tests::value;

/// One reading per marine column at `seconds`, ids `first_id..first_id + 7`
///
/// Salinity 35, equilibrator temperature 10.5 °C, pressure 1013.25 hPa,
/// xH₂O 0 and xCO₂ 400.
pub fn marine_row(first_id: i64, seconds: i64, intake: &str, run_type: &str) -> Vec<SensorValueRecord> {
    [intake, "35", "10.5", "1013.25", "0", "400", run_type]
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let column = i as i64 + 1;
            SensorValueRecord::from_sensor_value(&value(first_id + i as i64, column, seconds, raw))
                .unwrap()
        })
        .collect()
}

/// A marine dataset with rows at the given `(seconds, intake, run type)`
pub fn marine_input(instrument: Instrument, rows: &[(i64, &str, &str)]) -> DatasetInput {
    let sensor_values = rows
        .iter()
        .enumerate()
        .flat_map(|(row, (seconds, intake, run_type))| {
            marine_row(row as i64 * 10 + 1, *seconds, intake, run_type)
        })
        .collect();

    DatasetInput {
        dataset_id: 1,
        name: "test-dataset".to_string(),
        instrument,
        calibrations: Vec::new(),
        sensor_values,
    }
}

/// Three equilibrator rows a minute apart with ΔT of 0.5 °C
pub fn steady_input() -> DatasetInput {
    marine_input(
        marine_instrument(),
        &[(0, "10.0", "EQU"), (60, "10.0", "EQU"), (120, "10.0", "EQU")],
    )
}
