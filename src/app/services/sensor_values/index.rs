//! Time-ordered sensor value container with QC-aware neighbour search

use crate::app::models::{ColumnId, Flag, SensorValue, ValueLink};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Sensor values for one or more columns, ordered by time
///
/// Values must arrive in ascending time order; equal times are allowed.
/// Every value's column must be one of the columns the index was created for.
#[derive(Debug, Clone, Default)]
pub struct SensorValueIndex {
    column_ids: BTreeSet<ColumnId>,
    values: Vec<SensorValue>,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Backward,
    Forward,
}

impl SensorValueIndex {
    /// Create an empty index accepting the given columns
    pub fn new(column_ids: impl IntoIterator<Item = ColumnId>) -> Self {
        Self {
            column_ids: column_ids.into_iter().collect(),
            values: Vec::new(),
        }
    }

    pub fn for_column(column_id: ColumnId) -> Self {
        Self::new([column_id])
    }

    /// Build an index from values already in time order
    pub fn from_values(
        column_ids: impl IntoIterator<Item = ColumnId>,
        values: impl IntoIterator<Item = SensorValue>,
    ) -> Result<Self> {
        let mut index = Self::new(column_ids);
        for value in values {
            index.push(value)?;
        }
        Ok(index)
    }

    /// Append a value
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidColumn`] if the value's column is not held by this index
    /// * [`Error::OutOfOrder`] if the value is earlier than the last stored value
    pub fn push(&mut self, value: SensorValue) -> Result<()> {
        if !self.column_ids.contains(&value.column_id) {
            return Err(Error::InvalidColumn {
                column_id: value.column_id,
            });
        }
        if let Some(last) = self.values.last() {
            if value.time < last.time {
                return Err(Error::OutOfOrder {
                    id: value.id,
                    time: value.time.to_rfc3339(),
                    last: last.time.to_rfc3339(),
                });
            }
        }
        self.values.push(value);
        Ok(())
    }

    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.column_ids.iter().copied()
    }

    pub fn holds_column(&self, column_id: ColumnId) -> bool {
        self.column_ids.contains(&column_id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[SensorValue] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorValue> {
        self.values.iter()
    }

    pub fn get(&self, position: usize) -> Option<&SensorValue> {
        self.values.get(position)
    }

    /// Mutable access for flagging; times must not be changed
    pub(crate) fn get_mut(&mut self, position: usize) -> Option<&mut SensorValue> {
        self.values.get_mut(position)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut SensorValue> {
        self.values.iter_mut()
    }

    /// Position of the first value at or after `time`
    fn lower_bound(&self, time: DateTime<Utc>) -> usize {
        self.values.partition_point(|v| v.time < time)
    }

    /// The value with the greatest time at or before `time`
    pub fn time_search(&self, time: DateTime<Utc>) -> Option<&SensorValue> {
        let after = self.values.partition_point(|v| v.time <= time);
        after.checked_sub(1).map(|position| &self.values[position])
    }

    /// All values with `start <= time < end`, in time order
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] unless `start < end`
    pub fn range_search(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<&[SensorValue]> {
        if start >= end {
            return Err(Error::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        let from = self.lower_bound(start);
        let to = self.lower_bound(end);
        Ok(&self.values[from..to])
    }

    /// All values at exactly `time`
    pub fn values_at(&self, time: DateTime<Utc>) -> &[SensorValue] {
        let from = self.lower_bound(time);
        let to = self.values.partition_point(|v| v.time <= time);
        &self.values[from..to]
    }

    /// Find the sensor values to use for a measurement at `time`
    ///
    /// An exact hit is used directly unless it was taken while flushing, or
    /// `good_flags_only` is set and it is not good. Otherwise the nearest
    /// qualifying value is sought either side of `time`: good values always
    /// qualify and, without `good_flags_only`, the search in each direction
    /// also stops at the first questionable or bad value it meets even if a
    /// good value lies further out. Flushing and unevaluated values are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColumn`] if `column_id` is not held by this index
    pub fn populate_measurement_value(
        &self,
        column_id: ColumnId,
        time: DateTime<Utc>,
        good_flags_only: bool,
    ) -> Result<ValueLink> {
        if !self.holds_column(column_id) {
            return Err(Error::InvalidColumn { column_id });
        }

        let position = self.lower_bound(time);

        if let Some(exact) = self.values.get(position).filter(|v| v.time == time) {
            let flag = exact.effective_flag();
            if flag == Flag::Flushing {
                return Ok(ValueLink::empty(column_id));
            }
            if !good_flags_only || flag.is_good() {
                return Ok(ValueLink::new(column_id, Some(exact.id), None));
            }
        }

        let prior = self.search(position, Direction::Backward, good_flags_only);
        let post = self.search(position, Direction::Forward, good_flags_only);
        Ok(ValueLink::new(
            column_id,
            prior.map(|v| v.id),
            post.map(|v| v.id),
        ))
    }

    /// Scan from the insertion point for the first qualifying value
    fn search(&self, insertion: usize, direction: Direction, good_flags_only: bool) -> Option<&SensorValue> {
        let qualifies = |value: &&SensorValue| {
            let flag = value.effective_flag();
            flag.is_good() || (!good_flags_only && flag.is_poor())
        };

        match direction {
            Direction::Backward => self.values[..insertion].iter().rev().find(qualifies),
            Direction::Forward => self.values[insertion..].iter().find(qualifies),
        }
    }
}
