//! Reducer lookup by variable name

use super::atmospheric::{AtmosphericReducer, Co2Source};
use super::marine::MarineReducer;
use super::reducer::DataReducer;
use crate::app::models::CalculationParameter;
use crate::app::services::sensor_config::InstrumentVariable;
use crate::constants::PARAMETER_ID_MULTIPLIER;
use crate::constants::sensor_types::{XCO2, XCO2_DRY_NO_STANDARDS};
use crate::constants::variables::{
    ASVCO2_ATMOSPHERE, UNDERWAY_ATMOSPHERIC_PCO2, UNDERWAY_ATMOSPHERIC_PCO2_12_13,
    UNDERWAY_MARINE_PCO2,
};
use crate::{Error, Result};
use serde::Serialize;

/// Build the reducer for an instrument variable
///
/// # Errors
///
/// Returns a configuration error for an unknown variable name or a
/// variable whose attributes do not select a calculation
pub fn reducer_for(variable: &InstrumentVariable) -> Result<Box<dyn DataReducer>> {
    let reducer: Box<dyn DataReducer> = match variable.name.as_str() {
        UNDERWAY_MARINE_PCO2 => Box::new(MarineReducer::new(variable.clone())),
        UNDERWAY_ATMOSPHERIC_PCO2 => Box::new(AtmosphericReducer::new(
            variable.clone(),
            Co2Source::Single(XCO2),
        )),
        ASVCO2_ATMOSPHERE => Box::new(AtmosphericReducer::new(
            variable.clone(),
            Co2Source::Single(XCO2_DRY_NO_STANDARDS),
        )),
        UNDERWAY_ATMOSPHERIC_PCO2_12_13 => Box::new(AtmosphericReducer::new(
            variable.clone(),
            Co2Source::from_cal_gas_type(variable)?,
        )),
        other => {
            return Err(Error::configuration(format!(
                "Cannot find reducer for variable {}",
                other
            )));
        }
    };
    Ok(reducer)
}

/// A calculation parameter with its stable id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdentifiedParameter {
    pub id: i64,
    #[serde(flatten)]
    pub parameter: CalculationParameter,
}

/// The parameters a variable produces, ids `variable_id * 10000 + position`
///
/// Intermediate parameters are left out unless `include_intermediates` is set;
/// ids keep their positions either way.
pub fn calculation_parameters(
    variable: &InstrumentVariable,
    include_intermediates: bool,
) -> Result<Vec<IdentifiedParameter>> {
    let reducer = reducer_for(variable)?;
    Ok(reducer
        .calculation_parameters()
        .iter()
        .enumerate()
        .filter(|(_, parameter)| include_intermediates || parameter.is_result)
        .map(|(position, parameter)| IdentifiedParameter {
            id: variable.id * PARAMETER_ID_MULTIPLIER + position as i64,
            parameter: *parameter,
        })
        .collect())
}
