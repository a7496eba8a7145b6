//! Tests for calibration lookup and sensor calibration


use chrono::{DateTime, TimeZone, Utc};

pub fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 6, day, 0, 0, 0).unwrap()
}
