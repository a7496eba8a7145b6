//! Lookups over the sensor type graph

use super::{SensorType, SensorTypeGraph, SensorTypeId};
use crate::{Error, Result};

impl SensorTypeGraph {
    /// Look up a sensor type by id
    pub fn get(&self, id: SensorTypeId) -> Result<&SensorType> {
        self.by_id
            .get(&id)
            .map(|position| &self.nodes[*position])
            .ok_or_else(|| Error::sensor_type_not_found(id.to_string()))
    }

    /// Look up a sensor type by name
    pub fn by_name(&self, name: &str) -> Result<&SensorType> {
        self.by_name
            .get(name)
            .map(|position| &self.nodes[*position])
            .ok_or_else(|| Error::sensor_type_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn children(&self, sensor_type: &SensorType) -> Vec<&SensorType> {
        self.by_id
            .get(&sensor_type.id)
            .map(|position| {
                self.children[*position]
                    .iter()
                    .map(|child| &self.nodes[*child])
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn parent(&self, sensor_type: &SensorType) -> Option<&SensorType> {
        sensor_type.parent.and_then(|id| self.get(id).ok())
    }

    pub fn is_parent(&self, sensor_type: &SensorType) -> bool {
        self.by_id
            .get(&sensor_type.id)
            .is_some_and(|position| !self.children[*position].is_empty())
    }

    /// Other children of the same parent
    pub fn siblings(&self, sensor_type: &SensorType) -> Vec<&SensorType> {
        match self.parent(sensor_type) {
            Some(parent) => self
                .children(parent)
                .into_iter()
                .filter(|child| child.id != sensor_type.id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// The type this type depends on, ignoring any depends question
    pub fn depends_on(&self, sensor_type: &SensorType) -> Option<&SensorType> {
        sensor_type.depends_on.and_then(|id| self.get(id).ok())
    }

    pub fn diagnostic_types(&self) -> impl Iterator<Item = &SensorType> {
        self.nodes.iter().filter(|t| t.diagnostic)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorType> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
