//! All sensor values of one dataset, indexed per column, with a change set

use super::SensorValueIndex;
use crate::app::models::{ColumnId, DatasetId, SensorValue, SensorValueId};
use crate::app::services::sensor_config::SensorAssignments;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Ids of sensor values modified since they were last written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    ids: BTreeSet<SensorValueId>,
}

impl ChangeSet {
    pub fn insert(&mut self, id: SensorValueId) {
        self.ids.insert(id);
    }

    pub fn remove(&mut self, id: SensorValueId) {
        self.ids.remove(&id);
    }

    pub fn contains(&self, id: SensorValueId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SensorValueId> + '_ {
        self.ids.iter().copied()
    }
}

/// Sensor values of a dataset, one [`SensorValueIndex`] per column
///
/// Mutable access goes through [`DatasetSensorValues::get_mut`], which
/// records the value in the pending change set. Callers persist
/// [`DatasetSensorValues::pending_writes`] and then confirm with
/// [`DatasetSensorValues::mark_written`].
#[derive(Debug, Clone)]
pub struct DatasetSensorValues {
    dataset_id: DatasetId,
    columns: BTreeMap<ColumnId, SensorValueIndex>,
    positions: HashMap<SensorValueId, (ColumnId, usize)>,
    changes: ChangeSet,
}

impl DatasetSensorValues {
    pub fn new(dataset_id: DatasetId) -> Self {
        Self {
            dataset_id,
            columns: BTreeMap::new(),
            positions: HashMap::new(),
            changes: ChangeSet::default(),
        }
    }

    /// Load values in any order; they are sorted by time (then id) first
    pub fn from_values(dataset_id: DatasetId, mut values: Vec<SensorValue>) -> Result<Self> {
        values.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));
        let mut dataset = Self::new(dataset_id);
        for value in values {
            dataset.add(value)?;
        }
        Ok(dataset)
    }

    /// Add a value to its column's index
    ///
    /// # Errors
    ///
    /// Fails if the id is already present or the value is out of time order
    /// for its column
    pub fn add(&mut self, value: SensorValue) -> Result<()> {
        if self.positions.contains_key(&value.id) {
            return Err(Error::data_set(format!(
                "Duplicate sensor value id {}",
                value.id
            )));
        }

        let column_id = value.column_id;
        let id = value.id;
        let index = self
            .columns
            .entry(column_id)
            .or_insert_with(|| SensorValueIndex::for_column(column_id));
        index.push(value)?;
        self.positions.insert(id, (column_id, index.len() - 1));
        Ok(())
    }

    pub fn dataset_id(&self) -> DatasetId {
        self.dataset_id
    }

    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.keys().copied()
    }

    pub fn column(&self, column_id: ColumnId) -> Option<&SensorValueIndex> {
        self.columns.get(&column_id)
    }

    pub fn get(&self, id: SensorValueId) -> Option<&SensorValue> {
        let (column_id, position) = self.positions.get(&id)?;
        self.columns.get(column_id)?.get(*position)
    }

    /// Mutable access to a value; the value joins the pending change set
    pub fn get_mut(&mut self, id: SensorValueId) -> Option<&mut SensorValue> {
        let (column_id, position) = *self.positions.get(&id)?;
        let value = self.columns.get_mut(&column_id)?.get_mut(position)?;
        self.changes.insert(id);
        Some(value)
    }

    /// Apply `f` to every value of a column, recording values it reports as changed
    pub fn update_column<F>(&mut self, column_id: ColumnId, mut f: F)
    where
        F: FnMut(&mut SensorValue) -> bool,
    {
        if let Some(index) = self.columns.get_mut(&column_id) {
            for value in index.iter_mut() {
                if f(value) {
                    self.changes.insert(value.id);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Every value, column by column
    pub fn iter(&self) -> impl Iterator<Item = &SensorValue> {
        self.columns.values().flat_map(|index| index.iter())
    }

    /// Distinct times across the given columns, ascending
    pub fn times(&self, column_ids: &[ColumnId]) -> Vec<DateTime<Utc>> {
        let times: BTreeSet<DateTime<Utc>> = column_ids
            .iter()
            .filter_map(|column_id| self.columns.get(column_id))
            .flat_map(|index| index.iter().map(|v| v.time))
            .collect();
        times.into_iter().collect()
    }

    /// Whether every listed value is still awaiting user review
    ///
    /// Unknown ids count as not awaiting review.
    pub fn all_user_qc_needed(&self, ids: &[SensorValueId]) -> bool {
        ids.iter()
            .all(|id| self.get(*id).is_some_and(|v| v.user_qc_needed()))
    }

    /// Empty every raw value that equals its column's missing value marker
    ///
    /// Runs at load time, so cleared values do not join the change set.
    /// Returns the number of values cleared.
    pub fn clear_missing_values(&mut self, assignments: &SensorAssignments) -> usize {
        let markers = assignments.with_missing_values();
        let mut cleared = 0;
        for (column_id, index) in self.columns.iter_mut() {
            let Some(assignment) = markers.get(column_id) else {
                continue;
            };
            for value in index.iter_mut() {
                if value.value.as_deref().is_some_and(|raw| assignment.is_missing(raw)) {
                    value.value = None;
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Remove automatic QC results from every value
    pub fn clear_automatic_qc(&mut self) {
        let column_ids: Vec<ColumnId> = self.columns.keys().copied().collect();
        for column_id in column_ids {
            self.update_column(column_id, |value| {
                if value.auto_qc.is_empty() {
                    false
                } else {
                    value.clear_automatic_qc();
                    true
                }
            });
        }
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn has_pending_writes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Snapshots of every value awaiting a write, in id order
    pub fn pending_writes(&self) -> Vec<SensorValue> {
        self.changes
            .iter()
            .filter_map(|id| self.get(id).cloned())
            .collect()
    }

    /// Confirm values have been written
    pub fn mark_written(&mut self, ids: impl IntoIterator<Item = SensorValueId>) {
        for id in ids {
            self.changes.remove(id);
        }
    }
}
