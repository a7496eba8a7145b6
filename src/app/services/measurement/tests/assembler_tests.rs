//! Tests for measurement value assembly

use super::{built_in_graph, fixture, flagged, measurement_at, value};
use crate::app::models::{Flag, ValueLink};
use crate::app::services::measurement::MeasurementAssembler;
use crate::app::services::sensor_config::{
    Instrument, InstrumentVariable, SensorAssignment, SensorAssignments,
};
use crate::app::services::sensor_values::DatasetSensorValues;
use crate::constants::sensor_types::*;
use crate::constants::variables::{UNDERWAY_ATMOSPHERIC_PCO2_12_13, UNDERWAY_MARINE_PCO2};
use approx::assert_relative_eq;

#[test]
fn test_exact_good_hit_is_used_directly() {
    let (graph, instrument, values) = fixture(vec![
        flagged(1, 1, 0, "5.0", Flag::Good),
        flagged(2, 1, 10, "7.0", Flag::Good),
        flagged(3, 1, 20, "9.0", Flag::Good),
    ]);
    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values).with_good_flags_only(true);

    let sensor_type = graph.by_name(INTAKE_TEMPERATURE).unwrap();
    let result = assembler
        .assemble(&measurement_at(1, 10), sensor_type, variable)
        .unwrap();

    assert_eq!(result.member_count, 1);
    assert_eq!(result.links, vec![ValueLink::new(1, Some(2), None)]);
    assert_relative_eq!(result.calculated_value, 7.0);
    assert_eq!(result.qc_flag, Flag::Good);
}

#[test]
fn test_interpolates_between_neighbours() {
    let (graph, instrument, values) = fixture(vec![
        flagged(1, 1, 0, "10", Flag::Good),
        flagged(2, 1, 10, "0", Flag::Good),
    ]);
    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values);

    let sensor_type = graph.by_name(INTAKE_TEMPERATURE).unwrap();
    let result = assembler
        .assemble(&measurement_at(1, 4), sensor_type, variable)
        .unwrap();

    assert_eq!(result.member_count, 1);
    assert_eq!(result.links, vec![ValueLink::new(1, Some(1), Some(2))]);
    assert_relative_eq!(result.calculated_value, 6.0);
}

#[test]
fn test_flushing_exact_hit_is_empty() {
    let (graph, instrument, values) = fixture(vec![
        flagged(1, 1, 0, "10", Flag::Good),
        flagged(2, 1, 5, "99", Flag::Flushing),
        flagged(3, 1, 10, "0", Flag::Good),
    ]);
    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values);

    let sensor_type = graph.by_name(INTAKE_TEMPERATURE).unwrap();
    let result = assembler
        .assemble(&measurement_at(1, 5), sensor_type, variable)
        .unwrap();

    assert!(result.is_empty());
    assert!(result.links.is_empty());
    assert!(result.calculated_value.is_nan());
    assert_eq!(result.qc_flag, Flag::NoQc);
}

#[test]
fn test_poor_neighbour_flag_is_carried() {
    let (graph, instrument, values) = fixture(vec![
        flagged(1, 1, 0, "10", Flag::Questionable),
        flagged(2, 1, 10, "0", Flag::Good),
    ]);
    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values);

    let sensor_type = graph.by_name(INTAKE_TEMPERATURE).unwrap();
    let result = assembler
        .assemble(&measurement_at(1, 5), sensor_type, variable)
        .unwrap();

    assert_eq!(result.qc_flag, Flag::Questionable);
    assert_eq!(result.qc_messages, vec!["Questionable1".to_string()]);
    assert_relative_eq!(result.calculated_value, 5.0);
}

#[test]
fn test_good_flags_only_skips_poor_neighbours() {
    let (graph, instrument, values) = fixture(vec![
        flagged(1, 1, 0, "10", Flag::Good),
        flagged(2, 1, 4, "50", Flag::Bad),
        flagged(3, 1, 10, "0", Flag::Good),
    ]);
    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values).with_good_flags_only(true);

    let sensor_type = graph.by_name(INTAKE_TEMPERATURE).unwrap();
    let result = assembler
        .assemble(&measurement_at(1, 5), sensor_type, variable)
        .unwrap();

    assert_eq!(result.links, vec![ValueLink::new(1, Some(1), Some(3))]);
    assert_relative_eq!(result.calculated_value, 5.0);
    assert_eq!(result.qc_flag, Flag::Good);
}

#[test]
fn test_equilibrator_pressure_from_absolute_sensor() {
    let (graph, instrument, values) = fixture(vec![value(1, 4, 0, "1013.5")]);
    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values);

    let sensor_type = graph.by_name(EQUILIBRATOR_PRESSURE).unwrap();
    let result = assembler
        .assemble(&measurement_at(1, 0), sensor_type, variable)
        .unwrap();

    assert_eq!(result.sensor_type, EQUILIBRATOR_PRESSURE);
    assert_relative_eq!(result.calculated_value, 1013.5);
    assert_eq!(result.sensor_value_ids(), vec![1]);
}

#[test]
fn test_equilibrator_pressure_from_ambient_and_differential() {
    let graph = built_in_graph();
    let instrument = Instrument::new(
        1,
        "Differential",
        SensorAssignments::new(vec![
            SensorAssignment::new(1, EQUILIBRATOR_PRESSURE_DIFFERENTIAL),
            SensorAssignment::new(2, AMBIENT_PRESSURE),
        ]),
    )
    .with_variable(InstrumentVariable::new(1, UNDERWAY_MARINE_PCO2));
    let values =
        DatasetSensorValues::from_values(1, vec![value(1, 1, 0, "2.5"), value(2, 2, 0, "1010")])
            .unwrap();
    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values);

    let sensor_type = graph.by_name(EQUILIBRATOR_PRESSURE).unwrap();
    let result = assembler
        .assemble(&measurement_at(1, 0), sensor_type, variable)
        .unwrap();

    assert_relative_eq!(result.calculated_value, 1012.5);
    assert_eq!(result.sensor_value_ids(), vec![1, 2]);
}

#[test]
fn test_xco2_is_dried_when_question_answered() {
    let (graph, instrument, values) = fixture(vec![value(1, 5, 0, "20"), value(2, 6, 0, "400")]);
    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values);

    let sensor_type = graph.by_name(XCO2).unwrap();
    let result = assembler
        .assemble(&measurement_at(1, 0), sensor_type, variable)
        .unwrap();

    assert_relative_eq!(result.calculated_value, 400.0 / 0.98, epsilon = 1e-9);
    assert_eq!(result.supporting_ids, vec![1]);
    assert_eq!(result.sensor_value_ids(), vec![2, 1]);
}

#[test]
fn test_xco2_not_dried_without_answer() {
    let graph = built_in_graph();
    let instrument = Instrument::new(
        1,
        "Dry",
        SensorAssignments::new(vec![
            SensorAssignment::new(5, XH2O),
            SensorAssignment::new(6, XCO2).with_depends_question_answer(false),
        ]),
    )
    .with_variable(InstrumentVariable::new(1, UNDERWAY_MARINE_PCO2));
    let values =
        DatasetSensorValues::from_values(1, vec![value(1, 5, 0, "20"), value(2, 6, 0, "400")])
            .unwrap();
    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values);

    let result = assembler
        .assemble(&measurement_at(1, 0), graph.by_name(XCO2).unwrap(), variable)
        .unwrap();

    assert_relative_eq!(result.calculated_value, 400.0);
    assert!(result.supporting_ids.is_empty());
}

#[test]
fn test_isotope_variable_always_dried() {
    let graph = built_in_graph();
    let instrument = Instrument::new(
        1,
        "Isotopes",
        SensorAssignments::new(vec![
            SensorAssignment::new(5, XH2O),
            SensorAssignment::new(8, X12CO2),
        ]),
    )
    .with_variable(InstrumentVariable::new(3, UNDERWAY_ATMOSPHERIC_PCO2_12_13));
    let values =
        DatasetSensorValues::from_values(1, vec![value(1, 5, 0, "10"), value(2, 8, 0, "396")])
            .unwrap();
    let variable = instrument.variable(UNDERWAY_ATMOSPHERIC_PCO2_12_13).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values);

    let result = assembler
        .assemble(&measurement_at(1, 0), graph.by_name(X12CO2).unwrap(), variable)
        .unwrap();

    assert_relative_eq!(result.calculated_value, 400.0, epsilon = 1e-9);
}

#[test]
fn test_multiple_columns_are_averaged() {
    let graph = built_in_graph();
    let instrument = Instrument::new(
        1,
        "Two thermometers",
        SensorAssignments::new(vec![
            SensorAssignment::new(1, INTAKE_TEMPERATURE),
            SensorAssignment::new(2, INTAKE_TEMPERATURE).secondary(),
            SensorAssignment::new(3, INTAKE_TEMPERATURE).secondary(),
        ]),
    )
    .with_variable(InstrumentVariable::new(1, UNDERWAY_MARINE_PCO2));
    let values = DatasetSensorValues::from_values(
        1,
        vec![value(1, 1, 0, "10"), value(2, 2, 0, "12"), value(3, 3, 0, "")],
    )
    .unwrap();
    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values);

    let result = assembler
        .assemble(&measurement_at(1, 0), graph.by_name(INTAKE_TEMPERATURE).unwrap(), variable)
        .unwrap();

    assert_eq!(result.member_count, 2);
    assert_relative_eq!(result.calculated_value, 11.0);
}

#[test]
fn test_assemble_all_reports_missing_types() {
    let (graph, instrument, values) = fixture(vec![value(1, 1, 0, "10"), value(2, 2, 0, "35")]);
    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values);

    let assembled = assembler
        .assemble_all(
            &measurement_at(1, 0),
            variable,
            &[INTAKE_TEMPERATURE, SALINITY, EQUILIBRATOR_TEMPERATURE],
        )
        .unwrap();

    assert_eq!(assembled.len(), 3);
    assert_eq!(assembled.missing(&[INTAKE_TEMPERATURE, SALINITY, EQUILIBRATOR_TEMPERATURE]), vec![EQUILIBRATOR_TEMPERATURE]);
    assert_relative_eq!(assembled.value(SALINITY), 35.0);
    assert!(assembled.value(EQUILIBRATOR_TEMPERATURE).is_nan());
    assert_eq!(assembled.sensor_value_ids(), vec![1, 2]);
}

#[test]
fn test_missing_value_marker_does_not_contribute() {
    let graph = built_in_graph();
    let instrument = Instrument::new(
        1,
        "Twin intake",
        SensorAssignments::new(vec![
            SensorAssignment::new(1, INTAKE_TEMPERATURE),
            SensorAssignment::new(8, INTAKE_TEMPERATURE)
                .secondary()
                .with_missing_value("-999"),
        ]),
    )
    .with_variable(InstrumentVariable::new(1, UNDERWAY_MARINE_PCO2));
    let mut values =
        DatasetSensorValues::from_values(1, vec![value(1, 1, 0, "10.0"), value(2, 8, 0, "-999")])
            .unwrap();
    values.clear_missing_values(&instrument.assignments);

    let variable = instrument.variable(UNDERWAY_MARINE_PCO2).unwrap();
    let assembler = MeasurementAssembler::new(&graph, &instrument, &values);
    let result = assembler
        .assemble(
            &measurement_at(1, 0),
            graph.by_name(INTAKE_TEMPERATURE).unwrap(),
            variable,
        )
        .unwrap();

    assert_eq!(result.member_count, 1);
    assert_relative_eq!(result.calculated_value, 10.0);
}
