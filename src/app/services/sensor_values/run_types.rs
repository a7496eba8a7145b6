//! Run-type periods of a dataset's time axis

use crate::app::models::SensorValue;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A stretch of time during which the instrument reported one run type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTypePeriod {
    pub run_type: String,
    pub start: DateTime<Utc>,
    /// Time of the last reading of this run type; `DateTime::MAX_UTC` once
    /// the final period has been opened to the rest of time
    pub end: DateTime<Utc>,
}

impl RunTypePeriod {
    fn new(run_type: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            run_type: run_type.into(),
            start: time,
            end: time,
        }
    }

    /// Whether `time` lies within the period, both ends included
    pub fn encompasses(&self, time: DateTime<Utc>) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.end == DateTime::<Utc>::MAX_UTC
    }

    /// Whole seconds from the period start to `time`, negative before the start
    pub fn seconds_from_start(&self, time: DateTime<Utc>) -> i64 {
        (time - self.start).num_seconds()
    }

    /// Whole seconds from `time` to the period end
    pub fn seconds_to_end(&self, time: DateTime<Utc>) -> i64 {
        (self.end - time).num_seconds()
    }
}

/// Builds and queries the run-type periods of one dataset
///
/// Times must be added in strictly increasing order. Once finished, the last
/// period extends to the end of time and no more times can be added.
#[derive(Debug, Clone, Default)]
pub struct RunTypeTracker {
    periods: Vec<RunTypePeriod>,
    finished: bool,
}

impl RunTypeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a finished tracker from the values of a run type column
    ///
    /// Values without a run type are ignored.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a SensorValue>) -> Result<Self> {
        let mut tracker = Self::new();
        for value in values {
            if let Some(run_type) = value.value.as_deref() {
                tracker.add(run_type.trim(), value.time)?;
            }
        }
        tracker.finish();
        Ok(tracker)
    }

    /// Record the run type reported at `time`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataSet`] if the tracker is finished or `time` is not
    /// after the end of the current period
    pub fn add(&mut self, run_type: &str, time: DateTime<Utc>) -> Result<()> {
        if self.finished {
            return Err(Error::data_set("Run type periods are already finished"));
        }

        match self.periods.last_mut() {
            None => self.periods.push(RunTypePeriod::new(run_type, time)),
            Some(current) => {
                if time <= current.end {
                    return Err(Error::data_set(format!(
                        "Run type time {} must be after last period end time {}",
                        time.to_rfc3339(),
                        current.end.to_rfc3339()
                    )));
                }
                if current.run_type == run_type {
                    current.end = time;
                } else {
                    self.periods.push(RunTypePeriod::new(run_type, time));
                }
            }
        }
        Ok(())
    }

    /// Open the last period to the rest of time and lock the tracker
    pub fn finish(&mut self) {
        if let Some(last) = self.periods.last_mut() {
            last.end = DateTime::<Utc>::MAX_UTC;
        }
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn periods(&self) -> &[RunTypePeriod] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Whether any period encompasses `time`
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.period_at(time).is_some()
    }

    /// The period encompassing `time`
    pub fn period_at(&self, time: DateTime<Utc>) -> Option<&RunTypePeriod> {
        let after = self.periods.partition_point(|p| p.start <= time);
        after
            .checked_sub(1)
            .map(|position| &self.periods[position])
            .filter(|period| period.encompasses(time))
    }

    /// The period encompassing `time`, or the next one when `time` falls
    /// before the first period or between two periods
    pub fn period_for(&self, time: DateTime<Utc>) -> Option<&RunTypePeriod> {
        self.period_at(time).or_else(|| {
            let next = self.periods.partition_point(|p| p.start <= time);
            self.periods.get(next)
        })
    }

    pub fn run_type_at(&self, time: DateTime<Utc>) -> Option<&str> {
        self.period_at(time).map(|p| p.run_type.as_str())
    }

    /// Positions of `values` grouped by the run type of their period
    ///
    /// All periods with the same run type form one group. Values outside
    /// every period join the next period's group.
    pub fn group_by_run_type(&self, values: &[SensorValue]) -> BTreeMap<String, Vec<usize>> {
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (position, value) in values.iter().enumerate() {
            if let Some(period) = self.period_for(value.time) {
                groups
                    .entry(period.run_type.clone())
                    .or_default()
                    .push(position);
            }
        }
        groups
    }
}
