//! Application constants for the pCO₂ processor
//!
//! Flag values, sensor type and variable names, calculation parameter
//! names and the physical constants used by the reducers.

// =============================================================================
// Quality Control Flags
// =============================================================================

/// Stored integer values of QC flags
pub mod flag_values {
    /// The value could not be evaluated
    pub const NO_QC: i8 = 0;

    /// Value is good
    pub const GOOD: i8 = 2;

    /// Value has not been checked by a user but no routine objected
    pub const ASSUMED_GOOD: i8 = -2;

    /// Value is questionable
    pub const QUESTIONABLE: i8 = 3;

    /// Value is bad
    pub const BAD: i8 = 4;

    /// Awaiting user review
    pub const NEEDED: i8 = -10;

    /// Reading was taken while the instrument was flushing
    pub const FLUSHING: i8 = -100;
}

/// Separator used when QC messages are persisted as one string
pub const QC_MESSAGE_SEPARATOR: &str = ";";

// =============================================================================
// Sensor Types
// =============================================================================

/// Sensor type names used by the built-in reducers and assemblers
pub mod sensor_types {
    pub const INTAKE_TEMPERATURE: &str = "Intake Temperature";
    pub const SALINITY: &str = "Salinity";
    pub const EQUILIBRATOR_TEMPERATURE: &str = "Equilibrator Temperature";
    pub const EQUILIBRATOR_PRESSURE: &str = "Equilibrator Pressure";
    pub const EQUILIBRATOR_PRESSURE_ABSOLUTE: &str = "Equilibrator Pressure (absolute)";
    pub const EQUILIBRATOR_PRESSURE_DIFFERENTIAL: &str = "Equilibrator Pressure (differential)";
    pub const AMBIENT_PRESSURE: &str = "Ambient Pressure";
    pub const ATMOSPHERIC_PRESSURE: &str = "Atmospheric Pressure";
    pub const XH2O: &str = "xH₂O (with standards)";
    pub const XCO2: &str = "xCO₂ (with standards)";
    pub const XCO2_DRY_NO_STANDARDS: &str = "xCO₂ (dry, no standards)";
    pub const X12CO2: &str = "x¹²CO₂ (with standards)";
    pub const X13CO2: &str = "x¹³CO₂ (with standards)";
    pub const X12CO2_PLUS_X13CO2: &str = "x¹²CO₂ + x¹³CO₂ (with standards)";
    pub const RUN_TYPE: &str = "Run Type";
    pub const DIAGNOSTIC_WATER_FLOW: &str = "Diagnostic Water Flow";
    pub const DIAGNOSTIC_GAS_FLOW: &str = "Diagnostic Gas Flow";

    /// Question attached to the xCO₂ → xH₂O dependency
    pub const XCO2_DRYING_QUESTION: &str = "Do values from xCO₂ require moisture adjustment?";
}

// =============================================================================
// Variables
// =============================================================================

/// Variable names recognised by the reducer registry
pub mod variables {
    pub const UNDERWAY_MARINE_PCO2: &str = "Underway Marine pCO₂";
    pub const UNDERWAY_ATMOSPHERIC_PCO2: &str = "Underway Atmospheric pCO₂";
    pub const ASVCO2_ATMOSPHERE: &str = "ASVCO₂ Atmosphere";
    pub const UNDERWAY_ATMOSPHERIC_PCO2_12_13: &str = "Underway Atmospheric pCO₂ from ¹²CO₂/¹³CO₂";
}

/// Variable attribute keys and values
pub mod attributes {
    /// Height of the atmospheric pressure sensor above sea level, in metres
    pub const ATM_PRES_SENSOR_HEIGHT: &str = "atm_pres_sensor_height";

    /// How the ¹²CO₂/¹³CO₂ instrument was calibrated
    pub const CAL_GAS_TYPE: &str = "cal_gas_type";
    pub const CAL_GAS_TYPE_SPLIT: &str = "split";
    pub const CAL_GAS_TYPE_TOTAL: &str = "total";
}

// =============================================================================
// Calculation Parameters
// =============================================================================

/// Names of calculated parameters shared between reducers and QC routines
pub mod parameters {
    pub const DELTA_T: &str = "ΔT";
    pub const PH2O: &str = "pH₂O";
    pub const PCO2_TE_WET: &str = "pCO₂ TE Wet";
    pub const FCO2_TE_WET: &str = "fCO₂ TE Wet";
    pub const PCO2_SST: &str = "pCO₂ SST";
    pub const FCO2: &str = "fCO₂";
    pub const PCO2: &str = "pCO₂";
    pub const XCO2: &str = "xCO₂";
    pub const SEA_LEVEL_PRESSURE: &str = "Sea Level Pressure";
}

/// Parameter ids are `variable_id * PARAMETER_ID_MULTIPLIER + position`
pub const PARAMETER_ID_MULTIPLIER: i64 = 10_000;

// =============================================================================
// QC Routines
// =============================================================================

/// Routine identifiers stored in automatic QC results
pub mod routines {
    pub const OUTLIER: &str = "Outlier";
    pub const DIAGNOSTICS: &str = "Diagnostics";
    pub const PARAMETER_RANGE: &str = "ParameterRange";
    pub const OUT_OF_RANGE_MESSAGE: &str = "Out of range";
    pub const DELTA_T_MESSAGE: &str = "ΔT out of range";
    pub const BAD_LIMIT: &str = "bad_limit";
    pub const QUESTIONABLE_LIMIT: &str = "questionable_limit";
}

// =============================================================================
// Physical Constants
// =============================================================================

/// Physical constants used by the calculators
pub mod physics {
    /// 0 °C in kelvin
    pub const KELVIN_OFFSET: f64 = 273.15;

    /// Standard atmosphere in hPa
    pub const HPA_PER_ATM: f64 = 1013.25;

    /// Gas constant in cm³·atm/(mol·K)
    pub const GAS_CONSTANT_CM3_ATM: f64 = 82.0575;

    /// Specific gas constant for dry air, J/(kg·K)
    pub const DRY_AIR_GAS_CONSTANT: f64 = 287.05;

    /// Standard gravity, m/s²
    pub const GRAVITY: f64 = 9.80665;

    /// Temperature dependence of pCO₂ in seawater, per °C
    pub const PCO2_TEMPERATURE_COEFFICIENT: f64 = 0.0423;
}

// =============================================================================
// Defaults
// =============================================================================

/// Default configuration file name inside the user config directory
pub const CONFIG_DIR_NAME: &str = "pco2_processor";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Suffix for per-dataset JSON output files
pub const REDUCED_OUTPUT_SUFFIX: &str = "reduced.json";

/// Outlier routine standard deviation limit installed by default
pub const DEFAULT_OUTLIER_STDEV_LIMIT: &str = "5";

/// ΔT limits installed by default, in °C
pub const DEFAULT_DELTA_T_QUESTIONABLE_LIMIT: &str = "1.5";
pub const DEFAULT_DELTA_T_BAD_LIMIT: &str = "3";
