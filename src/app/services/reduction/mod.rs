//! Data reduction
//!
//! Each instrument variable is reduced by one [`DataReducer`] chosen from
//! the registry by variable name. A reducer names the sensor types it
//! needs and the parameters it produces; [`reduce`] turns one
//! measurement's assembled values into a [`DataReductionRecord`], applying
//! the missing-input and error policies shared by every reducer.
//!
//! [`DataReductionRecord`]: crate::app::models::DataReductionRecord

pub mod atmospheric;
pub mod calculators;
pub mod dependencies;
pub mod marine;
pub mod reducer;
pub mod registry;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use atmospheric::{AtmosphericReducer, Co2Source};
pub use dependencies::resolve_required_sensor_types;
pub use marine::MarineReducer;
pub use reducer::{DataReducer, reduce};
pub use registry::{IdentifiedParameter, calculation_parameters, reducer_for};
