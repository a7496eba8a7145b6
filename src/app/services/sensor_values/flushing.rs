//! Flushing-period flagging
//!
//! After a run type change the instrument needs time to settle. Readings
//! taken within the instrument's pre-flushing time after a period starts, or
//! its post-flushing time before a period ends, are flagged `FLUSHING` so
//! they never contribute to measurement values.

use super::{DatasetSensorValues, RunTypePeriod, RunTypeTracker};
use crate::app::models::{ColumnId, Flag};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Whether `time` falls in the flushing window of `period`
///
/// Times before the period start count as pre-flushing.
pub fn in_flushing_period(
    time: DateTime<Utc>,
    period: &RunTypePeriod,
    pre_seconds: i64,
    post_seconds: i64,
) -> bool {
    (pre_seconds > 0 && period.seconds_from_start(time) <= pre_seconds)
        || (post_seconds > 0 && !period.is_unbounded() && period.seconds_to_end(time) <= post_seconds)
}

/// Flag every value in a flushing window; returns how many were flagged
///
/// Values already reviewed by a user keep their flag. Values outside every
/// period use the next period.
pub fn apply_flushing_flags(
    values: &mut DatasetSensorValues,
    tracker: &RunTypeTracker,
    pre_seconds: i64,
    post_seconds: i64,
) -> usize {
    if (pre_seconds <= 0 && post_seconds <= 0) || tracker.is_empty() {
        return 0;
    }

    let mut flagged = 0;
    let column_ids: Vec<ColumnId> = values.column_ids().collect();
    for column_id in column_ids {
        values.update_column(column_id, |value| {
            let flushing = value.user_qc_needed()
                && tracker
                    .period_for(value.time)
                    .is_some_and(|p| in_flushing_period(value.time, p, pre_seconds, post_seconds));
            if flushing {
                value.set_user_qc(Flag::Flushing, "");
                flagged += 1;
            }
            flushing
        });
    }

    debug!("Flagged {} sensor values as flushing", flagged);
    flagged
}
