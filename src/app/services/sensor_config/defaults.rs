//! Built-in sensor types for underway and atmospheric CO₂ systems

use super::SensorType;
use crate::constants::sensor_types::*;

/// Sensor types available when the configuration does not define its own
pub fn default_sensor_types() -> Vec<SensorType> {
    vec![
        SensorType::new(1, INTAKE_TEMPERATURE).with_units("°C"),
        SensorType::new(2, SALINITY).with_units("PSU"),
        SensorType::new(3, EQUILIBRATOR_TEMPERATURE).with_units("°C"),
        SensorType::new(4, EQUILIBRATOR_PRESSURE).with_units("hPa"),
        SensorType::new(5, EQUILIBRATOR_PRESSURE_ABSOLUTE)
            .with_parent(4)
            .with_units("hPa"),
        SensorType::new(6, EQUILIBRATOR_PRESSURE_DIFFERENTIAL)
            .with_parent(4)
            .with_depends_on(7)
            .with_units("hPa"),
        SensorType::new(7, AMBIENT_PRESSURE).with_units("hPa"),
        SensorType::new(8, ATMOSPHERIC_PRESSURE).with_units("hPa"),
        SensorType::new(9, XH2O)
            .run_type_aware()
            .with_units("mmol mol⁻¹"),
        SensorType::new(10, XCO2)
            .with_depends_on(9)
            .with_depends_question(XCO2_DRYING_QUESTION)
            .run_type_aware()
            .with_units("μmol mol⁻¹"),
        SensorType::new(11, XCO2_DRY_NO_STANDARDS).with_units("μmol mol⁻¹"),
        SensorType::new(12, X12CO2)
            .with_depends_on(9)
            .run_type_aware()
            .with_units("μmol mol⁻¹"),
        SensorType::new(13, X13CO2)
            .with_depends_on(9)
            .run_type_aware()
            .with_units("μmol mol⁻¹"),
        SensorType::new(14, X12CO2_PLUS_X13CO2)
            .with_depends_on(9)
            .run_type_aware()
            .with_units("μmol mol⁻¹"),
        SensorType::new(15, RUN_TYPE),
        SensorType::new(16, DIAGNOSTIC_WATER_FLOW)
            .diagnostic()
            .with_units("L min⁻¹"),
        SensorType::new(17, DIAGNOSTIC_GAS_FLOW)
            .diagnostic()
            .with_units("mL min⁻¹"),
    ]
}
