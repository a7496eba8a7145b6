//! Sensor type dependency resolution
//!
//! Checked once per dataset and variable, before any measurement is reduced.

use crate::app::services::sensor_config::{SensorAssignments, SensorType, SensorTypeGraph};
use crate::{Error, Result};

/// Resolve a reducer's required sensor types against an instrument's assignments
///
/// A parent type is satisfied by any child that is assigned along with its
/// dependency chain, and every such child is included. Any other type must be assigned along with its own
/// chain. Returns every type needed, dependencies included, without repeats.
///
/// # Errors
///
/// Returns [`Error::UnresolvedSensorType`] naming the first type that
/// cannot be satisfied
pub fn resolve_required_sensor_types<'g>(
    graph: &'g SensorTypeGraph,
    assignments: &SensorAssignments,
    variable: &str,
    required: &[&str],
) -> Result<Vec<&'g SensorType>> {
    let mut resolved: Vec<&'g SensorType> = Vec::new();

    for name in required {
        let sensor_type = graph.by_name(name)?;

        let chain: Vec<&'g SensorType> = if graph.is_parent(sensor_type) {
            let child_chains: Vec<&'g SensorType> = graph
                .children(sensor_type)
                .into_iter()
                .filter_map(|child| assigned_chain(graph, assignments, child))
                .flatten()
                .collect();
            if child_chains.is_empty() {
                return Err(Error::unresolved_sensor_type(
                    variable,
                    &sensor_type.name,
                    format!(
                        "No assignments present for children of Sensor Type {} or their dependents",
                        sensor_type.name
                    ),
                ));
            }
            std::iter::once(sensor_type).chain(child_chains).collect()
        } else {
            assigned_chain(graph, assignments, sensor_type).ok_or_else(|| {
                Error::unresolved_sensor_type(
                    variable,
                    &sensor_type.name,
                    format!(
                        "No assignments present for Sensor Type {} or its dependents",
                        sensor_type.name
                    ),
                )
            })?
        };

        for sensor_type in chain {
            if !resolved.iter().any(|r| r.id == sensor_type.id) {
                resolved.push(sensor_type);
            }
        }
    }

    Ok(resolved)
}

/// The type and its dependencies if every one of them is assigned
fn assigned_chain<'g>(
    graph: &'g SensorTypeGraph,
    assignments: &SensorAssignments,
    sensor_type: &'g SensorType,
) -> Option<Vec<&'g SensorType>> {
    let mut chain = Vec::new();
    let mut current = Some(sensor_type);

    while let Some(sensor_type) = current {
        if !assignments.is_assigned(&sensor_type.name) {
            return None;
        }
        chain.push(sensor_type);
        current = assignments.depends_on(graph, sensor_type);
    }

    Some(chain)
}
