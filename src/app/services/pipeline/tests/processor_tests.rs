//! Unit tests for DatasetProcessor

use super::*;
use crate::ProcessorConfig;
use crate::app::models::Flag;
use crate::app::services::calibration::Calibration;
use crate::app::services::pipeline::{DatasetProcessor, ProcessedDataset};
use crate::app::services::sensor_config::tests::{built_in_graph, marine_assignments, marine_instrument};
use crate::app::services::sensor_config::{
    Instrument, InstrumentVariable, SensorAssignment, SensorAssignments,
};
use crate::app::services::sensor_values::tests::at;
use crate::constants::sensor_types::*;
use crate::constants::variables::UNDERWAY_MARINE_PCO2;
use crate::Error;
use approx::assert_relative_eq;

fn process(input: DatasetInput) -> crate::Result<ProcessedDataset> {
    let config = ProcessorConfig::default();
    let graph = built_in_graph();
    DatasetProcessor::new(&config, &graph).process(input)
}

#[test]
fn test_process_steady_dataset() {
    let processed = process(steady_input()).unwrap();

    assert_eq!(processed.measurements.len(), 3);
    assert_eq!(processed.records.len(), 3);
    assert_eq!(processed.output.measurements.len(), 3);
    assert_eq!(processed.output.data_reduction.len(), 3);

    for record in &processed.records {
        assert_eq!(record.qc_flag(), Flag::Good);
        assert_relative_eq!(record.get("ΔT").unwrap(), 0.5, epsilon = 1e-9);
        assert!(record.get("fCO₂").unwrap() > 0.0);
    }

    // Five sensor types per measurement, each from one exact reading
    assert_eq!(processed.output.measurement_values.len(), 15);
    assert!(processed.output.measurement_values.iter().all(|link| link.post.is_none()));

    assert!(processed.output.sensor_values.is_empty());
    assert_eq!(processed.stats.run_type_periods, 1);
    assert_eq!(processed.stats.sensor_values, 21);
}

#[test]
fn test_measurement_ids_follow_time_order() {
    let processed = process(steady_input()).unwrap();

    let ids: Vec<i64> = processed.measurements.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(processed.measurements[1].time, at(60));
    assert_eq!(processed.measurements[1].run_type.as_deref(), Some("EQU"));
    assert_eq!(processed.output.measurements[1].date, at(60).timestamp_millis());
}

#[test]
fn test_delta_t_failure_cascades_to_sensor_values() {
    let input = marine_input(
        marine_instrument(),
        &[(0, "10.0", "EQU"), (60, "13.0", "EQU"), (120, "10.0", "EQU")],
    );
    let processed = process(input).unwrap();

    let flagged = &processed.records[1];
    assert_eq!(flagged.qc_flag(), Flag::Questionable);
    assert_eq!(flagged.qc_messages(), ["ΔT out of range".to_string()]);
    assert_eq!(processed.records[0].qc_flag(), Flag::Good);
    assert_eq!(processed.stats.records_flagged, 1);

    // Five linked readings plus the xH₂O used for drying
    let mut written: Vec<i64> = processed.output.sensor_values.iter().map(|v| v.id).collect();
    written.sort();
    assert_eq!(written, vec![11, 12, 13, 14, 15, 16]);

    let intake = processed
        .output
        .sensor_values
        .iter()
        .find(|v| v.id == 11)
        .unwrap();
    assert_eq!(intake.value, "13.0");
    assert!(intake.auto_qc.contains("ΔT out of range"));
    assert_eq!(intake.user_qc_flag, i8::from(Flag::Needed));
}

#[test]
fn test_reviewed_value_blocks_cascade() {
    let mut input = marine_input(
        marine_instrument(),
        &[(0, "10.0", "EQU"), (60, "13.0", "EQU"), (120, "10.0", "EQU")],
    );
    let salinity = input.sensor_values.iter_mut().find(|v| v.id == 12).unwrap();
    salinity.user_qc_flag = Flag::Good.into();

    let processed = process(input).unwrap();

    assert_eq!(processed.records[1].qc_flag(), Flag::Good);
    assert!(processed.output.sensor_values.is_empty());
    assert_eq!(processed.stats.records_flagged, 0);
}

#[test]
fn test_calibrated_values_are_not_written_back() {
    let mut input = steady_input();
    input.calibrations.push(Calibration::polynomial(
        "1",
        at(-3600),
        vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.5],
    ));

    let processed = process(input).unwrap();

    assert_eq!(processed.stats.calibrated, 3);
    assert_relative_eq!(processed.records[0].get("ΔT").unwrap(), 0.0, epsilon = 1e-9);
    assert!(processed.output.sensor_values.is_empty());
}

#[test]
fn test_flushing_values_leave_measurement_empty() {
    let instrument = marine_instrument().with_flushing(30, 0);
    let input = marine_input(
        instrument,
        &[(0, "10.0", "EQU"), (60, "10.0", "EQU"), (120, "10.0", "EQU")],
    );

    let processed = process(input).unwrap();

    assert_eq!(processed.stats.flushing, 7);
    let first = &processed.records[0];
    assert_eq!(first.qc_flag(), Flag::NoQc);
    assert!(first.get("fCO₂").unwrap().is_nan());
    assert!(first.qc_messages().iter().any(|m| m == &format!("Missing {}", XCO2)));
    assert_eq!(processed.records[1].qc_flag(), Flag::Good);

    assert_eq!(processed.output.sensor_values.len(), 7);
    assert!(
        processed
            .output
            .sensor_values
            .iter()
            .all(|v| v.user_qc_flag == i8::from(Flag::Flushing))
    );
}

#[test]
fn test_measurements_follow_variable_run_types() {
    let input = marine_input(
        marine_instrument(),
        &[(0, "10.0", "EQU"), (60, "10.0", "ATM"), (120, "10.0", "EQU")],
    );

    let processed = process(input).unwrap();

    assert_eq!(processed.stats.run_type_periods, 3);
    assert_eq!(processed.measurements.len(), 3);
    let reduced: Vec<i64> = processed.records.iter().map(|r| r.measurement_id).collect();
    assert_eq!(reduced, vec![1, 3]);
}

#[test]
fn test_unknown_variable_aborts_dataset() {
    let instrument = Instrument::new(1, "Test Ship", marine_assignments())
        .with_variable(InstrumentVariable::new(9, "Soil Moisture"));
    let result = process(marine_input(instrument, &[(0, "10.0", "EQU")]));

    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[test]
fn test_unresolved_sensor_type_aborts_dataset() {
    let assignments = SensorAssignments::new(vec![
        SensorAssignment::new(1, INTAKE_TEMPERATURE),
        SensorAssignment::new(3, EQUILIBRATOR_TEMPERATURE),
        SensorAssignment::new(4, EQUILIBRATOR_PRESSURE_ABSOLUTE),
        SensorAssignment::new(5, XH2O),
        SensorAssignment::new(6, XCO2).with_depends_question_answer(true),
        SensorAssignment::new(7, RUN_TYPE),
    ]);
    let instrument = Instrument::new(1, "Test Ship", assignments)
        .with_variable(InstrumentVariable::new(1, UNDERWAY_MARINE_PCO2));
    let mut input = marine_input(instrument, &[(0, "10.0", "EQU")]);
    input.sensor_values.retain(|v| v.file_column != 2);

    match process(input) {
        Err(Error::UnresolvedSensorType { sensor_type, .. }) => assert_eq!(sensor_type, SALINITY),
        other => panic!("expected unresolved sensor type, got {:?}", other.map(|p| p.stats)),
    }
}

#[test]
fn test_reprocessing_is_idempotent() {
    let input = marine_input(
        marine_instrument(),
        &[(0, "10.0", "EQU"), (60, "13.0", "EQU"), (120, "10.0", "EQU")],
    );

    let first = process(input.clone()).unwrap();
    let second = process(input).unwrap();

    assert_eq!(first.output, second.output);
}

#[test]
fn test_missing_value_marker_gives_missing_record() {
    let assignments = marine_assignments()
        .iter()
        .cloned()
        .map(|a| {
            if a.sensor_type == INTAKE_TEMPERATURE {
                a.with_missing_value("-999")
            } else {
                a
            }
        })
        .collect();
    let instrument = Instrument::new(1, "Test Ship", SensorAssignments::new(assignments))
        .with_variable(InstrumentVariable::new(1, UNDERWAY_MARINE_PCO2).with_run_types(&["EQU"]));
    let input = marine_input(
        instrument,
        &[(0, "10.0", "EQU"), (60, "-999", "EQU"), (120, "10.0", "EQU")],
    );

    let processed = process(input).unwrap();

    assert_eq!(processed.stats.missing, 1);
    assert_eq!(processed.records[0].qc_flag(), Flag::Good);
    assert_eq!(processed.records[1].qc_flag(), Flag::NoQc);
    assert_eq!(
        processed.records[1].qc_messages(),
        &[format!("Missing {}", INTAKE_TEMPERATURE)]
    );
}
