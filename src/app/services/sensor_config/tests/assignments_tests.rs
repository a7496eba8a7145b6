//! Tests for sensor assignments and instrument settings

use super::{built_in_graph, marine_assignments, marine_instrument};
use crate::app::services::sensor_config::{
    DiagnosticRange, InstrumentVariable, SensorAssignment, SensorAssignments,
};
use crate::constants::sensor_types::*;
use std::collections::HashMap;

#[test]
fn test_assignment_lookups() {
    let assignments = marine_assignments();
    assert!(assignments.is_assigned(SALINITY));
    assert!(!assignments.is_assigned(ATMOSPHERIC_PRESSURE));
    assert_eq!(assignments.column_ids(XCO2), vec![6]);
    assert_eq!(assignments.run_type_column(), Some(7));
    assert_eq!(assignments.by_column(2).unwrap().sensor_type, SALINITY);
}

#[test]
fn test_primary_columns_first() {
    let assignments = SensorAssignments::new(vec![
        SensorAssignment::new(10, SALINITY).secondary(),
        SensorAssignment::new(11, SALINITY),
    ]);
    assert_eq!(assignments.column_ids(SALINITY), vec![11, 10]);
}

#[test]
fn test_depends_question_controls_dependency() {
    let graph = built_in_graph();
    let xco2 = graph.by_name(XCO2).unwrap();

    let answered = marine_assignments();
    assert_eq!(answered.depends_on(&graph, xco2).unwrap().name, XH2O);

    let unanswered = SensorAssignments::new(vec![SensorAssignment::new(6, XCO2)]);
    assert!(unanswered.depends_on(&graph, xco2).is_none());

    // No question: dependency always applies
    let x12 = graph.by_name(X12CO2).unwrap();
    assert_eq!(unanswered.depends_on(&graph, x12).unwrap().name, XH2O);
}

#[test]
fn test_validate_rejects_unknown_type_and_duplicate_column() {
    let graph = built_in_graph();

    let unknown = SensorAssignments::new(vec![SensorAssignment::new(1, "Wind Speed")]);
    assert!(unknown.validate(&graph).is_err());

    let duplicate = SensorAssignments::new(vec![
        SensorAssignment::new(1, SALINITY),
        SensorAssignment::new(1, INTAKE_TEMPERATURE),
    ]);
    assert!(duplicate.validate(&graph).is_err());
}

#[test]
fn test_diagnostic_assignments() {
    let graph = built_in_graph();
    let mut all = marine_assignments().iter().cloned().collect::<Vec<_>>();
    all.push(SensorAssignment::new(20, DIAGNOSTIC_WATER_FLOW));
    let assignments = SensorAssignments::new(all);

    let diagnostics: Vec<i64> = assignments
        .diagnostic_assignments(&graph)
        .map(|a| a.column_id)
        .collect();
    assert_eq!(diagnostics, vec![20]);
}

#[test]
fn test_variable_attributes() {
    let variable = InstrumentVariable::new(3, "Underway Atmospheric pCO₂")
        .with_attribute("atm_pres_sensor_height", "12.5")
        .with_attribute("bad", "tall");

    assert_eq!(
        variable.numeric_attribute("atm_pres_sensor_height").unwrap(),
        Some(12.5)
    );
    assert_eq!(variable.numeric_attribute("missing").unwrap(), None);
    assert!(variable.numeric_attribute("bad").is_err());

    assert!(variable.measures_run_type(None));
    let restricted = variable.with_run_types(&["ATM"]);
    assert!(restricted.measures_run_type(Some("ATM")));
    assert!(!restricted.measures_run_type(Some("EQU")));
    assert!(!restricted.measures_run_type(None));
}

#[test]
fn test_instrument_validation() {
    let graph = built_in_graph();
    let instrument = marine_instrument();
    assert!(instrument.validate(&graph).is_ok());

    let bad_range = marine_instrument().with_diagnostic_range(DiagnosticRange {
        column_id: 1,
        min: Some(5.0),
        max: Some(1.0),
        affected_columns: HashMap::new(),
    });
    assert!(bad_range.validate(&graph).is_err());

    let unassigned = marine_instrument().with_diagnostic_range(DiagnosticRange {
        column_id: 99,
        min: None,
        max: Some(1.0),
        affected_columns: HashMap::new(),
    });
    assert!(unassigned.validate(&graph).is_err());

    assert!(marine_instrument().with_flushing(-1, 0).validate(&graph).is_err());
}

#[test]
fn test_diagnostic_range_contains() {
    let range = DiagnosticRange {
        column_id: 1,
        min: Some(1.0),
        max: None,
        affected_columns: HashMap::from([("EQU".to_string(), vec![6])]),
    };
    assert!(range.contains(1.0));
    assert!(range.contains(1e9));
    assert!(!range.contains(0.5));
    assert_eq!(range.affected("EQU"), &[6]);
    assert!(range.affected("ATM").is_empty());
    assert_eq!(range.range_description(), "1 to -");
}
