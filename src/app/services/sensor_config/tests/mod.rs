//! Tests for the sensor type graph and instrument assignments

pub mod assignments_tests;

use crate::app::services::sensor_config::{
    Instrument, InstrumentVariable, SensorAssignment, SensorAssignments, SensorTypeGraph,
};
use crate::constants::sensor_types::*;
use crate::constants::variables::UNDERWAY_MARINE_PCO2;

/// The built-in graph
pub fn built_in_graph() -> SensorTypeGraph {
    SensorTypeGraph::built_in().unwrap()
}

/// Column assignments of a typical underway marine system
///
/// Columns: 1 intake temperature, 2 salinity, 3 equilibrator temperature,
/// 4 absolute equilibrator pressure, 5 xH₂O, 6 xCO₂ (drying required),
/// 7 run type.
pub fn marine_assignments() -> SensorAssignments {
    SensorAssignments::new(vec![
        SensorAssignment::new(1, INTAKE_TEMPERATURE),
        SensorAssignment::new(2, SALINITY),
        SensorAssignment::new(3, EQUILIBRATOR_TEMPERATURE),
        SensorAssignment::new(4, EQUILIBRATOR_PRESSURE_ABSOLUTE),
        SensorAssignment::new(5, XH2O),
        SensorAssignment::new(6, XCO2).with_depends_question_answer(true),
        SensorAssignment::new(7, RUN_TYPE),
    ])
}

/// A marine instrument measuring underway pCO₂ on the `EQU` run type
pub fn marine_instrument() -> Instrument {
    Instrument::new(1, "Test Ship", marine_assignments())
        .with_variable(InstrumentVariable::new(1, UNDERWAY_MARINE_PCO2).with_run_types(&["EQU"]))
}
