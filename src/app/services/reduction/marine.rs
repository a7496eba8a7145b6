//! Underway marine pCO₂ reducer

use super::calculators;
use super::reducer::DataReducer;
use crate::Result;
use crate::app::models::{CalculationParameter, DataReductionRecord};
use crate::app::services::calibration::CalibrationLookup;
use crate::app::services::measurement::MeasurementValues;
use crate::app::services::sensor_config::InstrumentVariable;
use crate::constants::parameters::{DELTA_T, FCO2, FCO2_TE_WET, PCO2_SST, PCO2_TE_WET, PH2O};
use crate::constants::sensor_types::{
    EQUILIBRATOR_PRESSURE, EQUILIBRATOR_TEMPERATURE, INTAKE_TEMPERATURE, SALINITY, XCO2,
};

static PARAMETERS: [CalculationParameter; 6] = [
    CalculationParameter::new(DELTA_T, "Water-Equilibrator Temperature Difference", "DELTAT", "°C", false),
    CalculationParameter::new(PH2O, "Marine Water Vapour Pressure", "RH2OX0EQ", "hPa", false),
    CalculationParameter::new(PCO2_TE_WET, "pCO₂ In Water - Equilibrator Temperature", "PCO2IG02", "μatm", false),
    CalculationParameter::new(FCO2_TE_WET, "fCO₂ In Water - Equilibrator Temperature", "FCO2IG02", "μatm", false),
    CalculationParameter::new(PCO2_SST, "pCO₂ In Water", "PCO2TK02", "μatm", true),
    CalculationParameter::new(FCO2, "fCO₂ In Water", "FCO2XXXX", "μatm", true),
];

/// Seawater pCO₂ from an equilibrator, corrected to sea surface temperature
pub struct MarineReducer {
    variable: InstrumentVariable,
}

impl MarineReducer {
    pub fn new(variable: InstrumentVariable) -> Self {
        Self { variable }
    }
}

impl DataReducer for MarineReducer {
    fn variable(&self) -> &InstrumentVariable {
        &self.variable
    }

    fn required_sensor_types(&self) -> Vec<&'static str> {
        vec![
            INTAKE_TEMPERATURE,
            SALINITY,
            EQUILIBRATOR_TEMPERATURE,
            EQUILIBRATOR_PRESSURE,
            XCO2,
        ]
    }

    fn core_sensor_types(&self) -> Vec<&'static str> {
        vec![XCO2]
    }

    fn calculation_parameters(&self) -> &'static [CalculationParameter] {
        &PARAMETERS
    }

    fn calculate(
        &self,
        values: &MeasurementValues,
        _calibrations: &dyn CalibrationLookup,
        record: &mut DataReductionRecord,
    ) -> Result<()> {
        let intake_temperature = values.value(INTAKE_TEMPERATURE);
        let salinity = values.value(SALINITY);
        let equilibrator_temperature = values.value(EQUILIBRATOR_TEMPERATURE);
        let equilibrator_pressure = values.value(EQUILIBRATOR_PRESSURE);
        let co2_in_gas = values.value(XCO2);

        let delta_t = (intake_temperature - equilibrator_temperature).abs();
        let ph2o = calculators::water_vapour_pressure(salinity, equilibrator_temperature);
        let pco2_te_wet = calculators::pco2_from_xco2(co2_in_gas, equilibrator_pressure, ph2o);
        let fco2_te_wet = calculators::fco2(
            pco2_te_wet,
            co2_in_gas,
            equilibrator_pressure,
            equilibrator_temperature,
        );
        let pco2_sst = calculators::to_sea_surface_temperature(
            pco2_te_wet,
            intake_temperature,
            equilibrator_temperature,
        );
        let fco2 = calculators::to_sea_surface_temperature(
            fco2_te_wet,
            intake_temperature,
            equilibrator_temperature,
        );

        record.put(DELTA_T, delta_t)?;
        record.put(PH2O, ph2o)?;
        record.put(PCO2_TE_WET, pco2_te_wet)?;
        record.put(FCO2_TE_WET, fco2_te_wet)?;
        record.put(PCO2_SST, pco2_sst)?;
        record.put(FCO2, fco2)?;
        Ok(())
    }
}
