//! Sensor type graph and instrument sensor assignments
//!
//! Sensor types form a small graph: a parent type (e.g. Equilibrator
//! Pressure) is satisfied by any of its children, and a type may depend on
//! another type being assigned (e.g. xCO₂ needs xH₂O for drying). The
//! graph is held as an arena of nodes with id and name indices, validated
//! once when built and read-only afterwards.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod assignments;
pub mod defaults;
pub mod instrument;
pub mod query;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use assignments::{SensorAssignment, SensorAssignments};
pub use defaults::default_sensor_types;
pub use instrument::{DiagnosticRange, Instrument, InstrumentVariable};

pub type SensorTypeId = i64;

/// One node of the sensor type graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorType {
    pub id: SensorTypeId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<SensorTypeId>,
    #[serde(default)]
    pub depends_on: Option<SensorTypeId>,
    /// When set, the dependency only applies if an assignment answers `true`
    #[serde(default)]
    pub depends_question: Option<String>,
    /// QC routines for this type run separately per run type
    #[serde(default)]
    pub run_type_aware: bool,
    #[serde(default)]
    pub diagnostic: bool,
    #[serde(default)]
    pub units: Option<String>,
}

impl SensorType {
    pub fn new(id: SensorTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            depends_on: None,
            depends_question: None,
            run_type_aware: false,
            diagnostic: false,
            units: None,
        }
    }

    pub fn with_parent(mut self, parent: SensorTypeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_depends_on(mut self, depends_on: SensorTypeId) -> Self {
        self.depends_on = Some(depends_on);
        self
    }

    pub fn with_depends_question(mut self, question: impl Into<String>) -> Self {
        self.depends_question = Some(question.into());
        self
    }

    pub fn run_type_aware(mut self) -> Self {
        self.run_type_aware = true;
        self
    }

    pub fn diagnostic(mut self) -> Self {
        self.diagnostic = true;
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }
}

/// Validated, read-only sensor type graph with O(1) id and name lookup
#[derive(Debug, Clone)]
pub struct SensorTypeGraph {
    pub(crate) nodes: Vec<SensorType>,
    pub(crate) by_id: HashMap<SensorTypeId, usize>,
    pub(crate) by_name: HashMap<String, usize>,
    /// Child node positions per node position
    pub(crate) children: Vec<Vec<usize>>,
}

impl SensorTypeGraph {
    /// Build and validate a graph
    ///
    /// # Errors
    ///
    /// Returns [`Error::SensorGraph`] when ids or names repeat, a reference
    /// points nowhere, a parent has fewer than two children, a node is both
    /// parent and child, a parent depends on another type, or depends-on
    /// links form a cycle.
    pub fn new(types: Vec<SensorType>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(types.len());
        let mut by_name = HashMap::with_capacity(types.len());

        for (position, sensor_type) in types.iter().enumerate() {
            if by_id.insert(sensor_type.id, position).is_some() {
                return Err(Error::sensor_graph(format!(
                    "Duplicate sensor type id {}",
                    sensor_type.id
                )));
            }
            if by_name.insert(sensor_type.name.clone(), position).is_some() {
                return Err(Error::sensor_graph(format!(
                    "Duplicate sensor type name '{}'",
                    sensor_type.name
                )));
            }
        }

        let mut children = vec![Vec::new(); types.len()];
        for (position, sensor_type) in types.iter().enumerate() {
            if let Some(parent_id) = sensor_type.parent {
                let parent = by_id.get(&parent_id).ok_or_else(|| {
                    Error::sensor_graph(format!(
                        "Parent {} of sensor type '{}' does not exist",
                        parent_id, sensor_type.name
                    ))
                })?;
                children[*parent].push(position);
            }
            if let Some(depends_id) = sensor_type.depends_on {
                if !by_id.contains_key(&depends_id) {
                    return Err(Error::sensor_graph(format!(
                        "Sensor type '{}' depends on unknown sensor type {}",
                        sensor_type.name, depends_id
                    )));
                }
            }
        }

        let graph = Self {
            nodes: types,
            by_id,
            by_name,
            children,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// The built-in marine carbon sensor types
    pub fn built_in() -> Result<Self> {
        Self::new(default_sensor_types())
    }

    fn validate(&self) -> Result<()> {
        for (position, sensor_type) in self.nodes.iter().enumerate() {
            let child_count = self.children[position].len();
            if child_count == 0 {
                continue;
            }

            if child_count == 1 {
                return Err(Error::sensor_graph(format!(
                    "Parent sensor type '{}' must have more than one child",
                    sensor_type.name
                )));
            }
            if sensor_type.parent.is_some() {
                return Err(Error::sensor_graph(format!(
                    "Sensor type '{}' cannot be both a parent and a child",
                    sensor_type.name
                )));
            }
            if sensor_type.depends_on.is_some() {
                return Err(Error::sensor_graph(format!(
                    "Parent sensor type '{}' cannot depend on another sensor type",
                    sensor_type.name
                )));
            }
        }

        for sensor_type in &self.nodes {
            let mut current = sensor_type.depends_on;
            let mut steps = 0;
            while let Some(id) = current {
                steps += 1;
                if id == sensor_type.id || steps > self.nodes.len() {
                    return Err(Error::sensor_graph(format!(
                        "Dependencies of sensor type '{}' form a cycle",
                        sensor_type.name
                    )));
                }
                current = self.by_id.get(&id).and_then(|p| self.nodes[*p].depends_on);
            }
        }

        Ok(())
    }
}
