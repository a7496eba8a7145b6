//! Instrument definition: assignments, variables, flushing and diagnostics

use super::{SensorAssignments, SensorTypeGraph};
use crate::app::models::{ColumnId, VariableId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A variable measured by an instrument, with its per-instrument attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentVariable {
    pub id: VariableId,
    pub name: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    /// Run types at which measurements are taken; empty means every run type
    #[serde(default)]
    pub measurement_run_types: Vec<String>,
}

impl InstrumentVariable {
    pub fn new(id: VariableId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes: HashMap::new(),
            measurement_run_types: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_run_types(mut self, run_types: &[&str]) -> Self {
        self.measurement_run_types = run_types.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// A numeric attribute, `None` when not set
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the attribute is not a number
    pub fn numeric_attribute(&self, key: &str) -> Result<Option<f64>> {
        match self.attribute(key) {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| {
                Error::configuration(format!(
                    "Attribute '{}' of variable '{}' is not numeric: '{}'",
                    key, self.name, raw
                ))
            }),
        }
    }

    pub fn measures_run_type(&self, run_type: Option<&str>) -> bool {
        if self.measurement_run_types.is_empty() {
            return true;
        }
        run_type.is_some_and(|r| self.measurement_run_types.iter().any(|m| m == r))
    }
}

/// Acceptable range of a diagnostic sensor and the columns its failures affect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRange {
    pub column_id: ColumnId,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    /// Columns flagged along with an out-of-range diagnostic, per run type
    #[serde(default)]
    pub affected_columns: HashMap<String, Vec<ColumnId>>,
}

impl DiagnosticRange {
    pub fn contains(&self, value: f64) -> bool {
        !(self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max))
    }

    pub fn affected(&self, run_type: &str) -> &[ColumnId] {
        self.affected_columns
            .get(run_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn range_description(&self) -> String {
        let bound = |b: Option<f64>| b.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
        format!("{} to {}", bound(self.min), bound(self.max))
    }
}

/// An instrument as seen by one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: i64,
    pub name: String,
    pub assignments: SensorAssignments,
    #[serde(default)]
    pub pre_flushing_seconds: i64,
    #[serde(default)]
    pub post_flushing_seconds: i64,
    #[serde(default)]
    pub variables: Vec<InstrumentVariable>,
    #[serde(default)]
    pub diagnostic_ranges: Vec<DiagnosticRange>,
}

impl Instrument {
    pub fn new(id: i64, name: impl Into<String>, assignments: SensorAssignments) -> Self {
        Self {
            id,
            name: name.into(),
            assignments,
            pre_flushing_seconds: 0,
            post_flushing_seconds: 0,
            variables: Vec::new(),
            diagnostic_ranges: Vec::new(),
        }
    }

    pub fn with_variable(mut self, variable: InstrumentVariable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_flushing(mut self, pre_seconds: i64, post_seconds: i64) -> Self {
        self.pre_flushing_seconds = pre_seconds;
        self.post_flushing_seconds = post_seconds;
        self
    }

    pub fn with_diagnostic_range(mut self, range: DiagnosticRange) -> Self {
        self.diagnostic_ranges.push(range);
        self
    }

    pub fn has_flushing(&self) -> bool {
        self.pre_flushing_seconds > 0 || self.post_flushing_seconds > 0
    }

    pub fn variable(&self, name: &str) -> Option<&InstrumentVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Check assignments against the graph and flushing/diagnostic settings
    pub fn validate(&self, graph: &SensorTypeGraph) -> Result<()> {
        self.assignments.validate(graph)?;

        if self.pre_flushing_seconds < 0 || self.post_flushing_seconds < 0 {
            return Err(Error::configuration(format!(
                "Instrument '{}' has negative flushing time",
                self.name
            )));
        }

        for range in &self.diagnostic_ranges {
            if self.assignments.by_column(range.column_id).is_none() {
                return Err(Error::configuration(format!(
                    "Diagnostic range refers to unassigned column {}",
                    range.column_id
                )));
            }
            if let (Some(min), Some(max)) = (range.min, range.max) {
                if min > max {
                    return Err(Error::configuration(format!(
                        "Diagnostic range for column {} has min {} above max {}",
                        range.column_id, min, max
                    )));
                }
            }
        }
        Ok(())
    }
}
