//! Sensor value storage and search
//!
//! Holds a dataset's sensor values in per-column time-ordered indices,
//! tracks the run-type periods of the dataset and flags readings taken
//! while the instrument was flushing.

pub mod dataset;
pub mod flushing;
pub mod index;
pub mod run_types;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use dataset::{ChangeSet, DatasetSensorValues};
pub use flushing::{apply_flushing_flags, in_flushing_period};
pub use index::SensorValueIndex;
pub use run_types::{RunTypePeriod, RunTypeTracker};
