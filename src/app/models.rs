//! Core data models for sensor values, measurements and reduction records
//!
//! This module contains the primary domain models used throughout the
//! processor: QC flags and automatic QC results, raw sensor values,
//! measurements, assembled measurement values and data reduction records.

use crate::constants::{QC_MESSAGE_SEPARATOR, flag_values};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub mod records;

pub type DatasetId = i64;
pub type ColumnId = i64;
pub type SensorValueId = i64;
pub type MeasurementId = i64;
pub type VariableId = i64;

// =============================================================================
// QC Flags
// =============================================================================

/// QC flag attached to sensor values, measurement values and reduction records
///
/// `Good`/`AssumedGood` > `Questionable` > `Bad` in quality; `Needed` means
/// a user has not reviewed the value yet, `NoQc` means it could not be
/// evaluated and `Flushing` marks readings taken while the instrument settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
#[repr(i8)]
pub enum Flag {
    NoQc = flag_values::NO_QC,
    Good = flag_values::GOOD,
    AssumedGood = flag_values::ASSUMED_GOOD,
    Questionable = flag_values::QUESTIONABLE,
    Bad = flag_values::BAD,
    Needed = flag_values::NEEDED,
    Flushing = flag_values::FLUSHING,
}

impl Flag {
    /// `Good` or `AssumedGood`
    pub fn is_good(self) -> bool {
        matches!(self, Flag::Good | Flag::AssumedGood)
    }

    /// `Questionable` or `Bad`
    pub fn is_poor(self) -> bool {
        matches!(self, Flag::Questionable | Flag::Bad)
    }

    /// Rank used for worst-of aggregation. Flags that carry no quality
    /// judgement rank lowest so any real judgement replaces them.
    pub fn severity(self) -> u8 {
        match self {
            Flag::NoQc | Flag::Needed | Flag::Flushing => 0,
            Flag::Good | Flag::AssumedGood => 1,
            Flag::Questionable => 2,
            Flag::Bad => 3,
        }
    }

    pub fn more_significant_than(self, other: Flag) -> bool {
        self.severity() > other.severity()
    }

    /// The worse of two flags, keeping `self` on a tie
    pub fn worst(self, other: Flag) -> Flag {
        if other.more_significant_than(self) {
            other
        } else {
            self
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Flag::NoQc => "No QC",
            Flag::Good => "Good",
            Flag::AssumedGood => "Assumed Good",
            Flag::Questionable => "Questionable",
            Flag::Bad => "Bad",
            Flag::Needed => "Needed",
            Flag::Flushing => "Flushing",
        }
    }
}

impl TryFrom<i8> for Flag {
    type Error = Error;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            flag_values::NO_QC => Ok(Flag::NoQc),
            flag_values::GOOD => Ok(Flag::Good),
            flag_values::ASSUMED_GOOD => Ok(Flag::AssumedGood),
            flag_values::QUESTIONABLE => Ok(Flag::Questionable),
            flag_values::BAD => Ok(Flag::Bad),
            flag_values::NEEDED => Ok(Flag::Needed),
            flag_values::FLUSHING => Ok(Flag::Flushing),
            _ => Err(Error::InvalidFlag {
                value: value as i32,
            }),
        }
    }
}

impl TryFrom<i32> for Flag {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        i8::try_from(value)
            .map_err(|_| Error::InvalidFlag { value })
            .and_then(Flag::try_from)
    }
}

impl From<Flag> for i8 {
    fn from(flag: Flag) -> Self {
        flag as i8
    }
}

impl FromStr for Flag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: i32 = s
            .trim()
            .parse()
            .map_err(|_| Error::configuration(format!("Invalid QC flag '{}'", s)))?;
        Flag::try_from(value)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as i8)
    }
}

// =============================================================================
// Automatic QC Results
// =============================================================================

/// Outcome of one automatic QC routine on one sensor value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineFlag {
    /// Identifier of the routine that raised the flag
    pub routine: String,
    pub flag: Flag,
    pub short_message: String,
    /// Limit the value should have met
    #[serde(rename = "required")]
    pub required_value: String,
    /// What the value actually was
    #[serde(rename = "actual")]
    pub actual_value: String,
}

impl RoutineFlag {
    pub fn new(
        routine: impl Into<String>,
        flag: Flag,
        short_message: impl Into<String>,
        required_value: impl Into<String>,
        actual_value: impl Into<String>,
    ) -> Self {
        Self {
            routine: routine.into(),
            flag,
            short_message: short_message.into(),
            required_value: required_value.into(),
            actual_value: actual_value.into(),
        }
    }
}

/// Ordered list of automatic QC outcomes for one sensor value
///
/// At most one entry per routine: a new flag from the same routine
/// replaces the previous one in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutoQcResult(Vec<RoutineFlag>);

impl AutoQcResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, flag: RoutineFlag) {
        match self.0.iter_mut().find(|f| f.routine == flag.routine) {
            Some(existing) => *existing = flag,
            None => self.0.push(flag),
        }
    }

    /// Overall automatic flag: the worst routine flag, `Good` when empty
    pub fn flag(&self) -> Flag {
        self.0
            .iter()
            .fold(Flag::Good, |worst, routine| worst.worst(routine.flag))
    }

    /// Short messages of all routines that objected, in order raised
    pub fn messages(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|f| !f.flag.is_good())
            .map(|f| f.short_message.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutineFlag> {
        self.0.iter()
    }

    /// Persisted JSON list form
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::json("Failed to encode automatic QC result", e))
    }

    /// Parse the persisted form. An empty string is an empty result.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
            .map_err(|e| Error::json("Failed to decode automatic QC result", e))
    }
}

// =============================================================================
// Sensor Values
// =============================================================================

/// One raw or calibrated reading for one instrument column at one time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorValue {
    pub id: SensorValueId,
    pub dataset_id: DatasetId,
    pub column_id: ColumnId,
    pub time: DateTime<Utc>,
    /// Raw value as extracted; `None` when the file held nothing
    pub value: Option<String>,
    pub auto_qc: AutoQcResult,
    pub user_qc_flag: Flag,
    pub user_qc_message: String,
}

impl SensorValue {
    /// Create a freshly extracted value awaiting user review
    pub fn new(
        id: SensorValueId,
        dataset_id: DatasetId,
        column_id: ColumnId,
        time: DateTime<Utc>,
        value: Option<String>,
    ) -> Self {
        Self {
            id,
            dataset_id,
            column_id,
            time,
            value: value.filter(|v| !v.trim().is_empty()),
            auto_qc: AutoQcResult::new(),
            user_qc_flag: Flag::Needed,
            user_qc_message: String::new(),
        }
    }

    /// Numeric value, NaN when missing or not a number
    pub fn double_value(&self) -> f64 {
        self.value
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN)
    }

    pub fn is_nan(&self) -> bool {
        self.double_value().is_nan()
    }

    pub fn auto_qc_flag(&self) -> Flag {
        self.auto_qc.flag()
    }

    /// The user flag, or the automatic flag while the user has not reviewed the value
    pub fn effective_flag(&self) -> Flag {
        if self.user_qc_flag == Flag::Needed {
            self.auto_qc_flag()
        } else {
            self.user_qc_flag
        }
    }

    /// Messages matching the effective flag
    pub fn effective_messages(&self) -> Vec<String> {
        if self.user_qc_flag == Flag::Needed {
            self.auto_qc.messages()
        } else if self.user_qc_message.is_empty() {
            Vec::new()
        } else {
            vec![self.user_qc_message.clone()]
        }
    }

    pub fn user_qc_needed(&self) -> bool {
        self.user_qc_flag == Flag::Needed
    }

    /// Record an automatic QC outcome. User flags are never touched.
    pub fn add_auto_qc_flag(&mut self, flag: RoutineFlag) {
        self.auto_qc.add(flag);
    }

    pub fn clear_automatic_qc(&mut self) {
        self.auto_qc.clear();
    }

    pub fn set_user_qc(&mut self, flag: Flag, message: impl Into<String>) {
        self.user_qc_flag = flag;
        self.user_qc_message = message.into();
    }

    /// Replace the stored value, keeping the textual form
    pub fn set_double_value(&mut self, value: f64) {
        self.value = if value.is_nan() {
            None
        } else {
            Some(value.to_string())
        };
    }
}

// =============================================================================
// Measurements
// =============================================================================

/// A point in time, with its run type, at which data reduction is performed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: MeasurementId,
    pub dataset_id: DatasetId,
    pub time: DateTime<Utc>,
    pub run_type: Option<String>,
}

impl Measurement {
    pub fn new(
        id: MeasurementId,
        dataset_id: DatasetId,
        time: DateTime<Utc>,
        run_type: Option<String>,
    ) -> Self {
        Self {
            id,
            dataset_id,
            time,
            run_type,
        }
    }
}

/// Sensor values from one column used for one measurement
///
/// `prior` alone means the value is used directly; `prior` and `post`
/// together mean the measurement time is interpolated between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueLink {
    pub column_id: ColumnId,
    pub prior: Option<SensorValueId>,
    pub post: Option<SensorValueId>,
}

impl ValueLink {
    /// Build a link, moving a lone post value into the prior slot
    pub fn new(
        column_id: ColumnId,
        prior: Option<SensorValueId>,
        post: Option<SensorValueId>,
    ) -> Self {
        match (prior, post) {
            (None, Some(post)) => Self {
                column_id,
                prior: Some(post),
                post: None,
            },
            (prior, post) => Self {
                column_id,
                prior,
                post,
            },
        }
    }

    pub fn empty(column_id: ColumnId) -> Self {
        Self {
            column_id,
            prior: None,
            post: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prior.is_none()
    }

    pub fn has_post(&self) -> bool {
        self.post.is_some()
    }

    pub fn sensor_value_ids(&self) -> impl Iterator<Item = SensorValueId> {
        self.prior.into_iter().chain(self.post)
    }
}

/// One sensor type's assembled contribution to one measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementValue {
    pub measurement_id: MeasurementId,
    pub sensor_type: String,
    /// Contributing columns; empty links are not stored
    pub links: Vec<ValueLink>,
    /// Sensor values used for secondary corrections (drying, pressure sums)
    pub supporting_ids: Vec<SensorValueId>,
    pub calculated_value: f64,
    pub member_count: usize,
    pub qc_flag: Flag,
    pub qc_messages: Vec<String>,
}

impl MeasurementValue {
    /// A value with no contributors
    pub fn empty(measurement_id: MeasurementId, sensor_type: impl Into<String>) -> Self {
        Self {
            measurement_id,
            sensor_type: sensor_type.into(),
            links: Vec::new(),
            supporting_ids: Vec::new(),
            calculated_value: f64::NAN,
            member_count: 0,
            qc_flag: Flag::NoQc,
            qc_messages: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.member_count == 0
    }

    /// Merge a contributing flag and its messages, worst flag wins
    pub fn add_qc(&mut self, flag: Flag, messages: impl IntoIterator<Item = String>) {
        if flag.more_significant_than(self.qc_flag) {
            self.qc_flag = flag;
            self.qc_messages.clear();
        }
        if flag == self.qc_flag && !flag.is_good() {
            for message in messages {
                if !self.qc_messages.contains(&message) {
                    self.qc_messages.push(message);
                }
            }
        }
    }

    /// Every sensor value this measurement value was built from
    pub fn sensor_value_ids(&self) -> Vec<SensorValueId> {
        self.links
            .iter()
            .flat_map(|link| link.sensor_value_ids())
            .chain(self.supporting_ids.iter().copied())
            .collect()
    }
}

// =============================================================================
// Data Reduction
// =============================================================================

/// Static description of one reducer output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalculationParameter {
    pub name: &'static str,
    pub long_name: &'static str,
    pub code_name: &'static str,
    pub units: &'static str,
    /// `false` for intermediate quantities
    pub is_result: bool,
}

impl CalculationParameter {
    pub const fn new(
        name: &'static str,
        long_name: &'static str,
        code_name: &'static str,
        units: &'static str,
        is_result: bool,
    ) -> Self {
        Self {
            name,
            long_name,
            code_name,
            units,
            is_result,
        }
    }
}

/// Reduced values for one measurement and one variable
#[derive(Debug, Clone, PartialEq)]
pub struct DataReductionRecord {
    pub measurement_id: MeasurementId,
    pub variable_id: VariableId,
    parameter_names: Vec<String>,
    values: HashMap<String, f64>,
    qc_flag: Flag,
    qc_messages: Vec<String>,
}

impl DataReductionRecord {
    /// Create a record with every parameter set to NaN
    pub fn new<S: AsRef<str>>(
        measurement_id: MeasurementId,
        variable_id: VariableId,
        parameter_names: impl IntoIterator<Item = S>,
    ) -> Self {
        let parameter_names: Vec<String> = parameter_names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        let values = parameter_names
            .iter()
            .map(|name| (name.clone(), f64::NAN))
            .collect();

        Self {
            measurement_id,
            variable_id,
            parameter_names,
            values,
            qc_flag: Flag::NoQc,
            qc_messages: Vec::new(),
        }
    }

    /// Set a calculated value
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no parameter with this name
    pub fn put(&mut self, name: &str, value: f64) -> Result<()> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::reduction(format!(
                "Unrecognised calculation parameter '{}'",
                name
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Values in parameter order
    pub fn values(&self) -> impl Iterator<Item = (&str, f64)> {
        self.parameter_names
            .iter()
            .map(|name| (name.as_str(), self.values.get(name).copied().unwrap_or(f64::NAN)))
    }

    pub fn set_all_nan(&mut self) {
        self.values.values_mut().for_each(|v| *v = f64::NAN);
    }

    pub fn qc_flag(&self) -> Flag {
        self.qc_flag
    }

    pub fn qc_messages(&self) -> &[String] {
        &self.qc_messages
    }

    /// Worst-of merge of a flag and its messages into the record
    pub fn set_qc(&mut self, flag: Flag, messages: impl IntoIterator<Item = String>) {
        if flag.more_significant_than(self.qc_flag) {
            self.qc_flag = flag;
            self.qc_messages.clear();
        }
        if flag == self.qc_flag && !flag.is_good() {
            for message in messages {
                if !self.qc_messages.contains(&message) {
                    self.qc_messages.push(message);
                }
            }
        }
    }

    /// Replace the flag and messages outright
    pub fn override_qc(&mut self, flag: Flag, messages: Vec<String>) {
        self.qc_flag = flag;
        self.qc_messages = messages;
    }

    /// Messages joined for persistence
    pub fn qc_message_string(&self) -> String {
        self.qc_messages.join(QC_MESSAGE_SEPARATOR)
    }
}
