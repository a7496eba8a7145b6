//! Atmospheric pCO₂ reducers
//!
//! All atmospheric variables share one calculation: pressure reduced to sea
//! level, water vapour pressure at the intake temperature, wet pCO₂ and its
//! fugacity. They differ only in where the xCO₂ comes from.

use super::calculators;
use super::reducer::DataReducer;
use crate::app::models::{CalculationParameter, DataReductionRecord};
use crate::app::services::calibration::CalibrationLookup;
use crate::app::services::measurement::MeasurementValues;
use crate::app::services::sensor_config::InstrumentVariable;
use crate::constants::attributes::{
    ATM_PRES_SENSOR_HEIGHT, CAL_GAS_TYPE, CAL_GAS_TYPE_SPLIT, CAL_GAS_TYPE_TOTAL,
};
use crate::constants::parameters::{FCO2, PCO2, PH2O, SEA_LEVEL_PRESSURE, XCO2};
use crate::constants::sensor_types::{
    ATMOSPHERIC_PRESSURE, INTAKE_TEMPERATURE, SALINITY, X12CO2, X12CO2_PLUS_X13CO2, X13CO2,
};
use crate::{Error, Result};

static PARAMETERS: [CalculationParameter; 5] = [
    CalculationParameter::new(SEA_LEVEL_PRESSURE, "Sea Level Pressure", "CAPASS01", "hPa", false),
    CalculationParameter::new(PH2O, "Atmosphere Water Vapour Pressure", "CPVPZZ01", "hPa", false),
    CalculationParameter::new(XCO2, "xCO₂ In Atmosphere", "XCO2DRAT", "μmol mol⁻¹", true),
    CalculationParameter::new(PCO2, "pCO₂ In Atmosphere", "ACO2XXXX", "μatm", true),
    CalculationParameter::new(FCO2, "fCO₂ In Atmosphere", "FCO2WTAT", "μatm", true),
];

/// Where an atmospheric reducer reads its xCO₂
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Co2Source {
    /// One sensor type holding total xCO₂
    Single(&'static str),
    /// ¹²CO₂ and ¹³CO₂ measured separately and summed
    Split,
}

impl Co2Source {
    /// Source for the isotope variable, from its `cal_gas_type` attribute
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the attribute is missing or unknown
    pub fn from_cal_gas_type(variable: &InstrumentVariable) -> Result<Self> {
        match variable.attribute(CAL_GAS_TYPE) {
            Some(CAL_GAS_TYPE_SPLIT) => Ok(Co2Source::Split),
            Some(CAL_GAS_TYPE_TOTAL) => Ok(Co2Source::Single(X12CO2_PLUS_X13CO2)),
            Some(other) => Err(Error::configuration(format!(
                "Unrecognised {} '{}' for variable '{}'",
                CAL_GAS_TYPE, other, variable.name
            ))),
            None => Err(Error::configuration(format!(
                "Variable '{}' requires the {} attribute",
                variable.name, CAL_GAS_TYPE
            ))),
        }
    }

    pub fn sensor_types(self) -> Vec<&'static str> {
        match self {
            Co2Source::Single(sensor_type) => vec![sensor_type],
            Co2Source::Split => vec![X12CO2, X13CO2],
        }
    }

    fn xco2(self, values: &MeasurementValues) -> f64 {
        match self {
            Co2Source::Single(sensor_type) => values.value(sensor_type),
            Co2Source::Split => values.value(X12CO2) + values.value(X13CO2),
        }
    }
}

pub struct AtmosphericReducer {
    variable: InstrumentVariable,
    co2: Co2Source,
}

impl AtmosphericReducer {
    pub fn new(variable: InstrumentVariable, co2: Co2Source) -> Self {
        Self { variable, co2 }
    }

    /// Sensor height above sea level: the calculation coefficient in force,
    /// else the variable attribute, else zero
    fn sensor_height(&self, values: &MeasurementValues, calibrations: &dyn CalibrationLookup) -> Result<f64> {
        if let Some(height) = calibrations.coefficient(
            self.variable.id,
            ATM_PRES_SENSOR_HEIGHT,
            values.measurement.time,
        ) {
            return Ok(height);
        }
        Ok(self
            .variable
            .numeric_attribute(ATM_PRES_SENSOR_HEIGHT)?
            .unwrap_or(0.0))
    }
}

impl DataReducer for AtmosphericReducer {
    fn variable(&self) -> &InstrumentVariable {
        &self.variable
    }

    fn required_sensor_types(&self) -> Vec<&'static str> {
        let mut types = vec![INTAKE_TEMPERATURE, SALINITY, ATMOSPHERIC_PRESSURE];
        types.extend(self.co2.sensor_types());
        types
    }

    fn core_sensor_types(&self) -> Vec<&'static str> {
        self.co2.sensor_types()
    }

    fn calculation_parameters(&self) -> &'static [CalculationParameter] {
        &PARAMETERS
    }

    fn calculate(
        &self,
        values: &MeasurementValues,
        calibrations: &dyn CalibrationLookup,
        record: &mut DataReductionRecord,
    ) -> Result<()> {
        let intake_temperature = values.value(INTAKE_TEMPERATURE);
        let salinity = values.value(SALINITY);
        let atmospheric_pressure = values.value(ATMOSPHERIC_PRESSURE);
        let co2_in_gas = self.co2.xco2(values);

        let sea_level_pressure = calculators::sea_level_pressure(
            atmospheric_pressure,
            intake_temperature,
            self.sensor_height(values, calibrations)?,
        );
        let ph2o = calculators::water_vapour_pressure(salinity, intake_temperature);
        let pco2 = calculators::pco2_from_xco2(co2_in_gas, sea_level_pressure, ph2o);
        let fco2 = calculators::fco2(pco2, co2_in_gas, sea_level_pressure, intake_temperature);

        record.put(SEA_LEVEL_PRESSURE, sea_level_pressure)?;
        record.put(PH2O, ph2o)?;
        record.put(XCO2, co2_in_gas)?;
        record.put(PCO2, pco2)?;
        record.put(FCO2, fco2)?;
        Ok(())
    }
}
