//! Persisted record shapes
//!
//! Flat, storage-facing forms of the domain models. Dates are epoch
//! milliseconds, automatic QC results and calculation values are JSON
//! strings and QC messages are joined with `;`.

use super::{
    ColumnId, DataReductionRecord, DatasetId, Flag, Measurement, MeasurementId, MeasurementValue,
    SensorValue, SensorValueId, VariableId,
};
use crate::app::models::AutoQcResult;
use crate::constants::QC_MESSAGE_SEPARATOR;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Convert a timestamp to epoch milliseconds
pub fn to_epoch_millis(time: &DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Convert epoch milliseconds to a timestamp
///
/// # Errors
///
/// Returns an error if the value is outside the representable range
pub fn from_epoch_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::data_set(format!("Date {} is out of range", millis)))
}

/// Split a persisted `;`-joined message string
pub fn split_messages(messages: &str) -> Vec<String> {
    messages
        .split(QC_MESSAGE_SEPARATOR)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Sensor Values
// =============================================================================

/// Stored form of a [`SensorValue`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorValueRecord {
    pub id: SensorValueId,
    #[serde(default)]
    pub dataset_id: DatasetId,
    pub file_column: ColumnId,
    pub date: i64,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub auto_qc: String,
    pub user_qc_flag: i8,
    #[serde(default)]
    pub user_qc_message: String,
}

impl SensorValueRecord {
    pub fn from_sensor_value(value: &SensorValue) -> Result<Self> {
        Ok(Self {
            id: value.id,
            dataset_id: value.dataset_id,
            file_column: value.column_id,
            date: to_epoch_millis(&value.time),
            value: value.value.clone().unwrap_or_default(),
            auto_qc: value.auto_qc.to_json()?,
            user_qc_flag: value.user_qc_flag.into(),
            user_qc_message: value.user_qc_message.clone(),
        })
    }
}

impl TryFrom<SensorValueRecord> for SensorValue {
    type Error = Error;

    fn try_from(record: SensorValueRecord) -> Result<Self> {
        let mut value = SensorValue::new(
            record.id,
            record.dataset_id,
            record.file_column,
            from_epoch_millis(record.date)?,
            Some(record.value),
        );
        value.auto_qc = AutoQcResult::from_json(&record.auto_qc)?;
        value.set_user_qc(Flag::try_from(record.user_qc_flag)?, record.user_qc_message);
        Ok(value)
    }
}

// =============================================================================
// Measurements
// =============================================================================

/// Stored form of a [`Measurement`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub id: MeasurementId,
    pub dataset_id: DatasetId,
    pub date: i64,
    pub run_type: Option<String>,
}

impl From<&Measurement> for MeasurementRecord {
    fn from(measurement: &Measurement) -> Self {
        Self {
            id: measurement.id,
            dataset_id: measurement.dataset_id,
            date: to_epoch_millis(&measurement.time),
            run_type: measurement.run_type.clone(),
        }
    }
}

impl TryFrom<MeasurementRecord> for Measurement {
    type Error = Error;

    fn try_from(record: MeasurementRecord) -> Result<Self> {
        Ok(Measurement::new(
            record.id,
            record.dataset_id,
            from_epoch_millis(record.date)?,
            record.run_type,
        ))
    }
}

/// Link between a measurement and the sensor values of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementValueRecord {
    pub measurement_id: MeasurementId,
    pub file_column_id: ColumnId,
    pub prior: SensorValueId,
    pub post: Option<SensorValueId>,
}

impl MeasurementValueRecord {
    /// One record per non-empty column link
    pub fn from_measurement_value(value: &MeasurementValue) -> Vec<Self> {
        value
            .links
            .iter()
            .filter_map(|link| {
                link.prior.map(|prior| Self {
                    measurement_id: value.measurement_id,
                    file_column_id: link.column_id,
                    prior,
                    post: link.post,
                })
            })
            .collect()
    }
}

// =============================================================================
// Data Reduction
// =============================================================================

/// Stored form of a [`DataReductionRecord`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataReductionRow {
    pub measurement_id: MeasurementId,
    pub variable_id: VariableId,
    /// JSON object of parameter name to value, NaN stored as `null`
    pub calculation_values: String,
    pub qc_flag: i8,
    pub qc_message: String,
}

impl DataReductionRow {
    pub fn from_record(record: &DataReductionRecord) -> Result<Self> {
        let values: Map<String, Value> = record
            .values()
            .map(|(name, value)| {
                let json = Number::from_f64(value)
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
                (name.to_string(), json)
            })
            .collect();

        Ok(Self {
            measurement_id: record.measurement_id,
            variable_id: record.variable_id,
            calculation_values: serde_json::to_string(&values)
                .map_err(|e| Error::json("Failed to encode calculation values", e))?,
            qc_flag: record.qc_flag().into(),
            qc_message: record.qc_message_string(),
        })
    }

    pub fn into_record(self) -> Result<DataReductionRecord> {
        let values: Map<String, Value> = serde_json::from_str(&self.calculation_values)
            .map_err(|e| Error::json("Failed to decode calculation values", e))?;

        let mut record =
            DataReductionRecord::new(self.measurement_id, self.variable_id, values.keys());
        for (name, value) in &values {
            record.put(name, value.as_f64().unwrap_or(f64::NAN))?;
        }
        record.override_qc(
            Flag::try_from(self.qc_flag)?,
            split_messages(&self.qc_message),
        );
        Ok(record)
    }
}
