//! pCO₂ Processor Library
//!
//! Turns irregularly timed CO₂ instrument readings into quality-controlled,
//! physically reduced measurement records.
//!
//! This library provides tools for:
//! - Indexing per-column sensor value time series with QC-aware neighbour search
//! - Tracking run-type periods and flushing windows
//! - Assembling per-measurement input values by exact match or interpolation
//! - Resolving sensor-type dependencies and dispatching variable reducers
//! - Running automatic QC routines and cascading flags back to sensor values
//! - Exporting reduction records to JSON, Parquet and CSV

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod calibration;
        pub mod export;
        pub mod measurement;
        pub mod pipeline;
        pub mod qc;
        pub mod reduction;
        pub mod sensor_config;
        pub mod sensor_values;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{DataReductionRecord, Flag, Measurement, MeasurementValue, SensorValue};
pub use config::ProcessorConfig;

/// Result type alias for the pCO₂ processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sensor value processing, data reduction and QC
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file could not be parsed
    #[error("Configuration file error in '{file}': {source}")]
    ConfigFile {
        file: String,
        #[source]
        source: toml::de::Error,
    },

    /// Export through polars failed
    #[error("Export error: {message}")]
    Export {
        message: String,
        #[source]
        source: polars::error::PolarsError,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Sensor type lookup failed
    #[error("Sensor type not found: {name}")]
    SensorTypeNotFound { name: String },

    /// Sensor type graph violates its structural rules
    #[error("Invalid sensor type graph: {message}")]
    SensorGraph { message: String },

    /// A required sensor type is not assigned on the instrument
    #[error("Cannot process variable '{variable}': {message}")]
    UnresolvedSensorType {
        variable: String,
        sensor_type: String,
        message: String,
    },

    /// Calculation failure for a single measurement
    #[error("Data reduction error: {message}")]
    Reduction { message: String },

    /// QC routine is misconfigured or failed
    #[error("QC routine '{routine}' failed: {message}")]
    Routine { routine: String, message: String },

    /// Dataset-level precondition violated (run types, flushing)
    #[error("Dataset error: {message}")]
    DataSet { message: String },

    /// A value was offered to an index that does not hold its column
    #[error("Column {column_id} is not held by this index")]
    InvalidColumn { column_id: i64 },

    /// A value was inserted before the last stored time
    #[error("Sensor value {id} at {time} is earlier than the last stored value at {last}")]
    OutOfOrder {
        id: i64,
        time: String,
        last: String,
    },

    /// Range search bounds are not ordered
    #[error("Invalid search range: start {start} must be before end {end}")]
    InvalidRange { start: String, end: String },

    /// Stored flag value is not recognised
    #[error("Invalid QC flag value: {value}")]
    InvalidFlag { value: i32 },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a JSON error with context
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            message: message.into(),
            source,
        }
    }

    /// Create an export error with context
    pub fn export(message: impl Into<String>, source: polars::error::PolarsError) -> Self {
        Self::Export {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a sensor type lookup error
    pub fn sensor_type_not_found(name: impl Into<String>) -> Self {
        Self::SensorTypeNotFound { name: name.into() }
    }

    /// Create a sensor type graph error
    pub fn sensor_graph(message: impl Into<String>) -> Self {
        Self::SensorGraph {
            message: message.into(),
        }
    }

    /// Create an unresolved dependency error
    pub fn unresolved_sensor_type(
        variable: impl Into<String>,
        sensor_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::UnresolvedSensorType {
            variable: variable.into(),
            sensor_type: sensor_type.into(),
            message: message.into(),
        }
    }

    /// Create a data reduction error
    pub fn reduction(message: impl Into<String>) -> Self {
        Self::Reduction {
            message: message.into(),
        }
    }

    /// Create a QC routine error
    pub fn routine(routine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Routine {
            routine: routine.into(),
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn data_set(message: impl Into<String>) -> Self {
        Self::DataSet {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::json("JSON processing failed", err)
    }
}

impl From<polars::error::PolarsError> for Error {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::export("Polars operation failed", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::unresolved_sensor_type(
            "Underway Marine pCO₂",
            "Salinity",
            "No assignments present for Sensor Type Salinity or its dependents",
        );
        assert_eq!(
            error.to_string(),
            "Cannot process variable 'Underway Marine pCO₂': No assignments present for Sensor Type Salinity or its dependents"
        );

        let error = Error::routine("Outlier", "Must have exactly one parameter");
        assert!(error.to_string().contains("Outlier"));
    }
}
