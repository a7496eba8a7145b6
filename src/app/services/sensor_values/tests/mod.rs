//! Tests for sensor value indexing, run types and flushing
//!
//! Shared fixtures build values at second offsets from a fixed base time.


use crate::app::models::{ColumnId, Flag, SensorValue};
use crate::app::services::sensor_values::SensorValueIndex;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap()
}

/// Time `seconds` after the base time
pub fn at(seconds: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(seconds)
}

/// A value awaiting review
pub fn value(id: i64, column_id: ColumnId, seconds: i64, raw: &str) -> SensorValue {
    SensorValue::new(id, 1, column_id, at(seconds), Some(raw.to_string()))
}

/// A value carrying a user flag; `Flag::Needed` leaves it unreviewed
pub fn flagged(id: i64, column_id: ColumnId, seconds: i64, raw: &str, flag: Flag) -> SensorValue {
    let mut value = value(id, column_id, seconds, raw);
    if flag != Flag::Needed {
        value.set_user_qc(flag, format!("{}{}", flag.label(), id));
    }
    value
}

/// Index of column 1 from `(seconds, value, flag)` triples, ids counting from 1
pub fn index_of(entries: &[(i64, &str, Flag)]) -> SensorValueIndex {
    SensorValueIndex::from_values(
        [1],
        entries
            .iter()
            .enumerate()
            .map(|(i, (seconds, raw, flag))| flagged(i as i64 + 1, 1, *seconds, raw, *flag)),
    )
    .unwrap()
}
