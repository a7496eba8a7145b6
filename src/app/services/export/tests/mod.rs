//! Tests for record export


use crate::app::models::{DataReductionRecord, Flag, Measurement};
use chrono::{TimeZone, Utc};

/// Two measurements a minute apart
pub fn measurements() -> Vec<Measurement> {
    let base = Utc.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap();
    vec![
        Measurement::new(1, 1, base, Some("EQU".to_string())),
        Measurement::new(2, 1, base + chrono::Duration::minutes(1), Some("EQU".to_string())),
    ]
}

/// A good record and one whose inputs were missing
pub fn records() -> Vec<DataReductionRecord> {
    let mut good = DataReductionRecord::new(1, 1, ["ΔT", "fCO₂"]);
    good.put("ΔT", 0.5).unwrap();
    good.put("fCO₂", 380.25).unwrap();
    good.set_qc(Flag::Good, Vec::new());

    let mut missing = DataReductionRecord::new(2, 1, ["ΔT", "fCO₂"]);
    missing.override_qc(
        Flag::NoQc,
        vec!["Missing Salinity".to_string(), "Missing Intake Temperature".to_string()],
    );

    vec![good, missing]
}
