//! Standard deviation outlier check

use super::routine::{AutoQcRoutine, RoutineOutcome};
use crate::app::models::{Flag, RoutineFlag, SensorValue};
use crate::constants::routines::OUTLIER;
use crate::{Error, Result};

/// Flags values further from the mean than `stdev_limit` standard deviations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierRoutine {
    stdev_limit: f64,
}

impl OutlierRoutine {
    pub fn new(stdev_limit: f64) -> Result<Self> {
        if stdev_limit.is_nan() || stdev_limit <= 0.0 {
            return Err(Error::routine(
                OUTLIER,
                "Standard deviation limit must be greater than zero",
            ));
        }
        Ok(Self { stdev_limit })
    }

    /// Build from configuration: exactly one positive number
    pub fn from_parameters(parameters: &[String]) -> Result<Self> {
        let [limit] = parameters else {
            return Err(Error::routine(
                OUTLIER,
                "Incorrect number of parameters. Must be <stdevLimit>",
            ));
        };
        let limit: f64 = limit.trim().parse().map_err(|_| {
            Error::routine(OUTLIER, "Standard deviation limit parameter must be numeric")
        })?;
        Self::new(limit)
    }

    pub fn stdev_limit(&self) -> f64 {
        self.stdev_limit
    }
}

/// Mean and population standard deviation in one pass, NaN ignored
pub fn mean_and_stdev(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut count = 0usize;
    let mut mean = 0.0;
    let mut variance = 0.0;

    for value in values.into_iter().filter(|v| !v.is_nan()) {
        count += 1;
        let n = count as f64;
        let d = value - mean;
        variance += (n - 1.0) * d * d / n;
        mean += d / n;
    }

    (count > 0).then(|| (mean, (variance / count as f64).sqrt()))
}

impl AutoQcRoutine for OutlierRoutine {
    fn name(&self) -> &'static str {
        OUTLIER
    }

    fn evaluate(&self, values: &[&SensorValue]) -> Vec<RoutineOutcome> {
        let Some((mean, stdev)) = mean_and_stdev(values.iter().map(|v| v.double_value())) else {
            return Vec::new();
        };

        values
            .iter()
            .filter(|v| !v.is_nan())
            .filter(|v| (v.double_value() - mean).abs() > stdev * self.stdev_limit)
            .map(|v| {
                (
                    v.id,
                    RoutineFlag::new(
                        OUTLIER,
                        Flag::Bad,
                        "Standard deviation is too large",
                        self.stdev_limit.to_string(),
                        stdev.to_string(),
                    ),
                )
            })
            .collect()
    }
}
