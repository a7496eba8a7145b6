//! Automatic quality control
//!
//! Pre-reduction routines check sensor values column by column, per run
//! type for run-type aware sensor types. Diagnostic sensors are checked
//! against instrument ranges and cascade their flags to the columns they
//! affect. Post-reduction routines check calculated parameters and cascade
//! a flag back to every contributing sensor value, but only while none of
//! them has been reviewed by a user.

pub mod data_reduction;
pub mod diagnostics;
pub mod outlier;
pub mod routine;
pub mod runner;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use data_reduction::{DataReductionRoutineSettings, ParameterRangeRoutine, RangeOptions};
pub use diagnostics::apply_diagnostic_qc;
pub use outlier::OutlierRoutine;
pub use routine::{AutoQcRoutine, ROUTINE_NAMES, RoutineAssignment, RoutineOutcome, build_routine};
pub use runner::{QcRunner, QcSummary};

use crate::app::models::RoutineFlag;
use crate::constants::routines::{DIAGNOSTICS, OUTLIER};

/// Full description of a routine flag for display
pub fn long_message(flag: &RoutineFlag) -> String {
    match flag.routine.as_str() {
        OUTLIER => format!(
            "Standard deviation is {}, should be <= {}",
            flag.actual_value, flag.required_value
        ),
        DIAGNOSTICS => format!(
            "{}: is {}, should be {}",
            flag.short_message, flag.actual_value, flag.required_value
        ),
        _ => format!(
            "{}: is {}, should be ±{}",
            flag.short_message, flag.actual_value, flag.required_value
        ),
    }
}
