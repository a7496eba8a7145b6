//! Time-scoped calibrations
//!
//! A calibration targets either an instrument column (a polynomial applied to
//! raw readings) or a calculation coefficient of a variable, named
//! `<variable id>.<coefficient>`. Lookups return the most recent calibration
//! deployed at or before the requested time.

use crate::app::models::VariableId;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod sensor;

#[cfg(test)]
pub mod tests;

pub use sensor::apply_sensor_calibrations;

/// Number of polynomial coefficients: x⁵, x⁴, x³, x², x and the intercept
pub const POLYNOMIAL_COEFFICIENT_COUNT: usize = 6;

/// What a calibration does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalibrationKind {
    /// Coefficients from the highest power (x⁵) down to the intercept
    Polynomial { coefficients: Vec<f64> },
    /// A single value used by a reducer
    Coefficient { value: f64 },
}

/// One calibration of one target, in force from its deployment date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub target: String,
    pub deployment_date: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: CalibrationKind,
}

impl Calibration {
    pub fn polynomial(
        target: impl Into<String>,
        deployment_date: DateTime<Utc>,
        coefficients: Vec<f64>,
    ) -> Self {
        Self {
            target: target.into(),
            deployment_date,
            kind: CalibrationKind::Polynomial { coefficients },
        }
    }

    pub fn coefficient(
        variable_id: VariableId,
        name: &str,
        deployment_date: DateTime<Utc>,
        value: f64,
    ) -> Self {
        Self {
            target: coefficient_target(variable_id, name),
            deployment_date,
            kind: CalibrationKind::Coefficient { value },
        }
    }

    pub fn validate(&self) -> Result<()> {
        match &self.kind {
            CalibrationKind::Polynomial { coefficients }
                if coefficients.len() != POLYNOMIAL_COEFFICIENT_COUNT =>
            {
                Err(Error::configuration(format!(
                    "Polynomial calibration for '{}' needs {} coefficients, found {}",
                    self.target,
                    POLYNOMIAL_COEFFICIENT_COUNT,
                    coefficients.len()
                )))
            }
            _ => Ok(()),
        }
    }

    /// Apply the calibration to a raw value; coefficients leave values unchanged
    pub fn calibrate(&self, raw: f64) -> f64 {
        match &self.kind {
            CalibrationKind::Polynomial { coefficients } => coefficients
                .iter()
                .rev()
                .enumerate()
                .map(|(power, coefficient)| coefficient * raw.powi(power as i32))
                .sum(),
            CalibrationKind::Coefficient { .. } => raw,
        }
    }

    /// The coefficient value, `None` for polynomial calibrations
    pub fn value(&self) -> Option<f64> {
        match self.kind {
            CalibrationKind::Coefficient { value } => Some(value),
            CalibrationKind::Polynomial { .. } => None,
        }
    }
}

/// Calibration target name of a calculation coefficient
pub fn coefficient_target(variable_id: VariableId, name: &str) -> String {
    format!("{}.{}", variable_id, name)
}

/// Source of time-scoped calibrations
pub trait CalibrationLookup {
    /// The calibration of `target` deployed most recently at or before `time`
    fn most_recent_calibration(&self, target: &str, time: DateTime<Utc>) -> Option<&Calibration>;

    /// A variable's calculation coefficient in force at `time`
    fn coefficient(&self, variable_id: VariableId, name: &str, time: DateTime<Utc>) -> Option<f64> {
        self.most_recent_calibration(&coefficient_target(variable_id, name), time)
            .and_then(Calibration::value)
    }
}

/// Calibrations of one instrument, per target in deployment order
#[derive(Debug, Clone, Default)]
pub struct CalibrationSet {
    by_target: HashMap<String, Vec<Calibration>>,
}

impl CalibrationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_calibrations(calibrations: impl IntoIterator<Item = Calibration>) -> Result<Self> {
        let mut set = Self::new();
        for calibration in calibrations {
            set.add(calibration)?;
        }
        Ok(set)
    }

    /// Add a calibration, keeping its target's list ordered by deployment date
    pub fn add(&mut self, calibration: Calibration) -> Result<()> {
        calibration.validate()?;
        let list = self.by_target.entry(calibration.target.clone()).or_default();
        let position = list.partition_point(|c| c.deployment_date <= calibration.deployment_date);
        list.insert(position, calibration);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_target.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }

    pub fn has_target(&self, target: &str) -> bool {
        self.by_target.contains_key(target)
    }
}

impl CalibrationLookup for CalibrationSet {
    fn most_recent_calibration(&self, target: &str, time: DateTime<Utc>) -> Option<&Calibration> {
        let list = self.by_target.get(target)?;
        let after = list.partition_point(|c| c.deployment_date <= time);
        after.checked_sub(1).map(|position| &list[position])
    }
}
