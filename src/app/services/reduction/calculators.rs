//! Pure physical correction functions
//!
//! Temperatures are in °C, pressures in hPa unless stated, mole fractions in
//! μmol mol⁻¹ and partial pressures/fugacities in μatm.

use crate::constants::physics::{
    DRY_AIR_GAS_CONSTANT, GAS_CONSTANT_CM3_ATM, GRAVITY, HPA_PER_ATM, KELVIN_OFFSET,
    PCO2_TEMPERATURE_COEFFICIENT,
};

pub fn kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

pub fn hpa_to_atm(hpa: f64) -> f64 {
    hpa / HPA_PER_ATM
}

/// Linear interpolation of `y` at `x` between `(x0, y0)` and `(x1, y1)`
///
/// If either point's `y` is NaN the other point's value is returned; if
/// the two `x` values coincide the first point's value is returned.
pub fn interpolate(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    if y0.is_nan() {
        return y1;
    }
    if y1.is_nan() || x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Pressure reduced to sea level from a sensor `height` metres above it
pub fn sea_level_pressure(pressure: f64, temperature: f64, height: f64) -> f64 {
    if height == 0.0 {
        return pressure;
    }
    pressure + pressure * GRAVITY * height / (DRY_AIR_GAS_CONSTANT * kelvin(temperature))
}

/// Water vapour pressure over seawater in atm (Weiss and Price, 1980)
pub fn water_vapour_pressure(salinity: f64, temperature: f64) -> f64 {
    let k = kelvin(temperature);
    (24.4543 - 67.4509 * (100.0 / k) - 4.8489 * (k / 100.0).ln() - 0.000544 * salinity).exp()
}

/// Wet-basis pCO₂ in μatm from dry xCO₂, pressure in hPa and pH₂O in atm
pub fn pco2_from_xco2(xco2: f64, pressure: f64, ph2o: f64) -> f64 {
    xco2 * (hpa_to_atm(pressure) - ph2o)
}

/// Fugacity of CO₂ in μatm (Weiss, 1974)
pub fn fco2(pco2: f64, xco2: f64, pressure: f64, temperature: f64) -> f64 {
    let k = kelvin(temperature);
    let b = -1636.75 + 12.0408 * k - 0.0327957 * k.powi(2) + 3.16528e-5 * k.powi(3);
    let delta = 57.7 - 0.118 * k;
    let mole_fraction_air = 1.0 - xco2 * 1e-6;
    let exponent =
        ((b + 2.0 * mole_fraction_air.powi(2) * delta) * hpa_to_atm(pressure)) / (GAS_CONSTANT_CM3_ATM * k);
    pco2 * exponent.exp()
}

/// Move a CO₂ partial pressure or fugacity from equilibrator to sea surface temperature
pub fn to_sea_surface_temperature(value: f64, sst: f64, equilibrator_temperature: f64) -> f64 {
    value * (PCO2_TEMPERATURE_COEFFICIENT * (sst - equilibrator_temperature)).exp()
}

/// Dry a CO₂ mole fraction using the water mole fraction in mmol mol⁻¹
pub fn dry_xco2(xco2: f64, xh2o: f64) -> f64 {
    xco2 / (1.0 - xh2o / 1000.0)
}

/// Arithmetic mean ignoring NaN; NaN when nothing remains
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}
