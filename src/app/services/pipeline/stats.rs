//! Processing statistics for one dataset pass

use crate::app::models::{DataReductionRecord, Flag};
use crate::app::services::qc::QcSummary;
use serde::Serialize;
use std::collections::BTreeMap;

/// Statistics for one dataset processing pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetStats {
    /// Number of sensor values loaded
    pub sensor_values: usize,
    /// Number of values matching their column's missing value marker
    pub missing: usize,
    /// Number of values changed by sensor calibrations
    pub calibrated: usize,
    /// Number of run type periods found
    pub run_type_periods: usize,
    /// Number of values flagged as flushing
    pub flushing: usize,
    /// Pre-reduction QC counts
    #[serde(skip)]
    pub sensor_qc: QcSummary,
    /// Number of measurements located across all variables
    pub measurements: usize,
    /// Number of data reduction records produced
    pub records: usize,
    /// Number of records degraded by a calculation failure or missing input
    pub records_without_qc: usize,
    /// Number of records flagged by post-reduction QC
    pub records_flagged: usize,
    /// Records per QC flag label
    pub flag_counts: BTreeMap<String, usize>,
    /// Number of sensor values awaiting a write
    pub pending_writes: usize,
}

impl DatasetStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a finished record
    pub fn add_record(&mut self, record: &DataReductionRecord) {
        self.records += 1;
        if record.qc_flag() == Flag::NoQc {
            self.records_without_qc += 1;
        }
        *self
            .flag_counts
            .entry(record.qc_flag().label().to_string())
            .or_default() += 1;
    }

    /// Share of records that could be evaluated, as a percentage
    pub fn reduction_rate(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            ((self.records - self.records_without_qc) as f64 / self.records as f64) * 100.0
        }
    }

    /// Get summary of processing pipeline statistics
    pub fn summary(&self) -> String {
        format!(
            "{} sensor values -> {} measurements -> {} records ({:.1}% reduced) | \
             Flushing: {} | Sensor QC flags: {} | Record QC flags: {} | Pending writes: {}",
            self.sensor_values,
            self.measurements,
            self.records,
            self.reduction_rate(),
            self.flushing,
            self.sensor_qc.values_flagged + self.sensor_qc.diagnostic_flags,
            self.records_flagged,
            self.pending_writes
        )
    }
}
