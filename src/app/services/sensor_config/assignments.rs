//! Assignment of instrument file columns to sensor types

use super::{SensorType, SensorTypeGraph};
use crate::app::models::ColumnId;
use crate::constants::sensor_types::RUN_TYPE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One instrument column assigned to a sensor type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorAssignment {
    pub column_id: ColumnId,
    /// Sensor type name
    pub sensor_type: String,
    #[serde(default)]
    pub sensor_name: String,
    #[serde(default = "default_primary")]
    pub primary: bool,
    /// Answer to the sensor type's depends question, if it has one
    #[serde(default)]
    pub depends_question_answer: bool,
    /// Raw value that marks a missing reading
    #[serde(default)]
    pub missing_value: Option<String>,
}

fn default_primary() -> bool {
    true
}

impl SensorAssignment {
    pub fn new(column_id: ColumnId, sensor_type: impl Into<String>) -> Self {
        let sensor_type = sensor_type.into();
        Self {
            column_id,
            sensor_name: sensor_type.clone(),
            sensor_type,
            primary: true,
            depends_question_answer: false,
            missing_value: None,
        }
    }

    pub fn with_depends_question_answer(mut self, answer: bool) -> Self {
        self.depends_question_answer = answer;
        self
    }

    pub fn secondary(mut self) -> Self {
        self.primary = false;
        self
    }

    pub fn with_missing_value(mut self, marker: impl Into<String>) -> Self {
        self.missing_value = Some(marker.into());
        self
    }

    /// Whether a raw reading is this column's missing value marker
    pub fn is_missing(&self, raw: &str) -> bool {
        self.missing_value
            .as_deref()
            .is_some_and(|marker| !marker.trim().is_empty() && marker.trim() == raw.trim())
    }
}

/// All column assignments of one instrument
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorAssignments {
    assignments: Vec<SensorAssignment>,
}

impl SensorAssignments {
    pub fn new(assignments: Vec<SensorAssignment>) -> Self {
        Self { assignments }
    }

    /// Check every assignment names a known sensor type and columns are unique
    pub fn validate(&self, graph: &SensorTypeGraph) -> Result<()> {
        let mut columns = HashSet::new();
        for assignment in &self.assignments {
            graph.by_name(&assignment.sensor_type)?;
            if !columns.insert(assignment.column_id) {
                return Err(Error::configuration(format!(
                    "Column {} is assigned more than once",
                    assignment.column_id
                )));
            }
        }
        Ok(())
    }

    pub fn is_assigned(&self, sensor_type: &str) -> bool {
        self.assignments.iter().any(|a| a.sensor_type == sensor_type)
    }

    pub fn for_type<'a>(&'a self, sensor_type: &'a str) -> impl Iterator<Item = &'a SensorAssignment> {
        self.assignments
            .iter()
            .filter(move |a| a.sensor_type == sensor_type)
    }

    /// Columns assigned to a type, primary sensors first
    pub fn column_ids(&self, sensor_type: &str) -> Vec<ColumnId> {
        let mut assigned: Vec<&SensorAssignment> = self.for_type(sensor_type).collect();
        assigned.sort_by_key(|a| !a.primary);
        assigned.into_iter().map(|a| a.column_id).collect()
    }

    /// Assignments that declare a missing value marker, by column
    pub fn with_missing_values(&self) -> HashMap<ColumnId, &SensorAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.missing_value.is_some())
            .map(|a| (a.column_id, a))
            .collect()
    }

    pub fn by_column(&self, column_id: ColumnId) -> Option<&SensorAssignment> {
        self.assignments.iter().find(|a| a.column_id == column_id)
    }

    /// Whether any assignment of the type answered its depends question `true`
    pub fn depends_question_answered(&self, sensor_type: &str) -> bool {
        self.for_type(sensor_type).any(|a| a.depends_question_answer)
    }

    /// The type that must also be assigned for `sensor_type` to be usable
    ///
    /// A dependency guarded by a depends question only applies when some
    /// assignment of the type answered the question `true`.
    pub fn depends_on<'g>(
        &self,
        graph: &'g SensorTypeGraph,
        sensor_type: &SensorType,
    ) -> Option<&'g SensorType> {
        let dependency = graph.depends_on(sensor_type)?;
        match sensor_type.depends_question {
            None => Some(dependency),
            Some(_) if self.depends_question_answered(&sensor_type.name) => Some(dependency),
            Some(_) => None,
        }
    }

    pub fn run_type_column(&self) -> Option<ColumnId> {
        self.for_type(RUN_TYPE).next().map(|a| a.column_id)
    }

    /// Assignments whose sensor type is diagnostic
    pub fn diagnostic_assignments<'a>(
        &'a self,
        graph: &'a SensorTypeGraph,
    ) -> impl Iterator<Item = &'a SensorAssignment> {
        self.assignments.iter().filter(move |a| {
            graph
                .by_name(&a.sensor_type)
                .map(|t| t.diagnostic)
                .unwrap_or(false)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorAssignment> {
        self.assignments.iter()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
