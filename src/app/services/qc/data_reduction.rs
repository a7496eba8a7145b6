//! Post-reduction QC of calculated parameters

use crate::app::models::{DataReductionRecord, Flag, RoutineFlag};
use crate::app::services::measurement::MeasurementValues;
use crate::app::services::sensor_values::DatasetSensorValues;
use crate::constants::routines::{BAD_LIMIT, PARAMETER_RANGE, QUESTIONABLE_LIMIT};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configured limits, kept as text until the routine is built
pub type RangeOptions = BTreeMap<String, String>;

/// A post-reduction routine configured for a variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataReductionRoutineSettings {
    pub variable: String,
    #[serde(default = "default_routine")]
    pub routine: String,
    /// Calculated parameter to check
    pub parameter: String,
    pub short_message: String,
    #[serde(default)]
    pub options: RangeOptions,
}

fn default_routine() -> String {
    PARAMETER_RANGE.to_string()
}

impl DataReductionRoutineSettings {
    pub fn parameter_range(
        variable: impl Into<String>,
        parameter: impl Into<String>,
        short_message: impl Into<String>,
        questionable_limit: &str,
        bad_limit: &str,
    ) -> Self {
        let options = [
            (QUESTIONABLE_LIMIT.to_string(), questionable_limit.to_string()),
            (BAD_LIMIT.to_string(), bad_limit.to_string()),
        ]
        .into_iter()
        .collect();

        Self {
            variable: variable.into(),
            routine: default_routine(),
            parameter: parameter.into(),
            short_message: short_message.into(),
            options,
        }
    }
}

/// Flags records whose parameter magnitude exceeds the configured limits
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRangeRoutine {
    parameter: String,
    short_message: String,
    questionable_limit: f64,
    bad_limit: f64,
}

impl ParameterRangeRoutine {
    /// # Errors
    ///
    /// Returns [`Error::Routine`] for another routine type or a missing or
    /// non-numeric limit
    pub fn from_settings(settings: &DataReductionRoutineSettings) -> Result<Self> {
        if settings.routine != PARAMETER_RANGE {
            return Err(Error::routine(
                &settings.routine,
                "Unknown data reduction QC routine",
            ));
        }

        let limit = |key: &str| -> Result<f64> {
            let raw = settings.options.get(key).ok_or_else(|| {
                Error::routine(PARAMETER_RANGE, format!("Missing option '{}'", key))
            })?;
            raw.trim().parse().map_err(|_| {
                Error::routine(
                    PARAMETER_RANGE,
                    format!("Option '{}' must be numeric, got '{}'", key, raw),
                )
            })
        };

        Ok(Self {
            parameter: settings.parameter.clone(),
            short_message: settings.short_message.clone(),
            questionable_limit: limit(QUESTIONABLE_LIMIT)?,
            bad_limit: limit(BAD_LIMIT)?,
        })
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// The flag a record earns, if any
    pub fn evaluate(&self, record: &DataReductionRecord) -> Option<RoutineFlag> {
        let value = record.get(&self.parameter).filter(|v| !v.is_nan())?;

        let (flag, limit) = if value.abs() > self.bad_limit {
            (Flag::Bad, self.bad_limit)
        } else if value.abs() > self.questionable_limit {
            (Flag::Questionable, self.questionable_limit)
        } else {
            return None;
        };

        Some(RoutineFlag::new(
            PARAMETER_RANGE,
            flag,
            self.short_message.clone(),
            limit.to_string(),
            value.to_string(),
        ))
    }

    /// Check one record and cascade a failure
    ///
    /// The flag goes to every sensor value behind the measurement and to
    /// the record, but only if none of those sensor values has been
    /// reviewed by a user. Returns whether anything was flagged.
    pub fn apply(
        &self,
        record: &mut DataReductionRecord,
        measurement_values: &MeasurementValues,
        sensor_values: &mut DatasetSensorValues,
    ) -> bool {
        let Some(flag) = self.evaluate(record) else {
            return false;
        };

        let ids = measurement_values.sensor_value_ids();
        if !sensor_values.all_user_qc_needed(&ids) {
            return false;
        }

        for id in &ids {
            if let Some(value) = sensor_values.get_mut(*id) {
                value.add_auto_qc_flag(flag.clone());
            }
        }
        record.set_qc(flag.flag, [flag.short_message]);
        true
    }
}
