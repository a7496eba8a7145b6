//! Export of processing results
//!
//! Data reduction records become one polars [`DataFrame`] per dataset with a
//! column per calculation parameter, written as Parquet or CSV. The full
//! [`DatasetOutput`](crate::app::services::pipeline::DatasetOutput) is
//! written as JSON. Every file is written to a temporary file beside its
//! destination and moved into place, so an interrupted write leaves nothing
//! behind.

use crate::Result;
use crate::app::models::records::to_epoch_millis;
use crate::app::models::{DataReductionRecord, Measurement, MeasurementId};
use polars::prelude::*;
use std::collections::HashMap;

pub mod writer;

#[cfg(test)]
pub mod tests;

pub use writer::{StagedFile, stage_frame, stage_json, write_frame, write_json};

pub const MEASUREMENT_ID_COLUMN: &str = "measurement_id";
pub const VARIABLE_ID_COLUMN: &str = "variable_id";
pub const DATE_COLUMN: &str = "date";
pub const QC_FLAG_COLUMN: &str = "qc_flag";
pub const QC_MESSAGE_COLUMN: &str = "qc_message";

/// Build the export frame for a dataset's records
///
/// Parameter columns appear in the order they are first met; a record
/// without a parameter, or with a NaN value, gives a null. Records whose
/// measurement is unknown get a null date.
pub fn reduction_frame(
    measurements: &[Measurement],
    records: &[DataReductionRecord],
) -> Result<DataFrame> {
    let times: HashMap<MeasurementId, i64> = measurements
        .iter()
        .map(|m| (m.id, to_epoch_millis(&m.time)))
        .collect();

    let mut parameter_names: Vec<&str> = Vec::new();
    for record in records {
        for name in record.parameter_names() {
            if !parameter_names.contains(&name.as_str()) {
                parameter_names.push(name.as_str());
            }
        }
    }

    let dates: Vec<Option<i64>> = records
        .iter()
        .map(|r| times.get(&r.measurement_id).copied())
        .collect();
    let date_column = Column::new(DATE_COLUMN.into(), dates)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let mut columns = vec![
        Column::new(
            MEASUREMENT_ID_COLUMN.into(),
            records.iter().map(|r| r.measurement_id).collect::<Vec<i64>>(),
        ),
        Column::new(
            VARIABLE_ID_COLUMN.into(),
            records.iter().map(|r| r.variable_id).collect::<Vec<i64>>(),
        ),
        date_column,
    ];

    for name in &parameter_names {
        let values: Vec<Option<f64>> = records
            .iter()
            .map(|r| r.get(name).filter(|v| !v.is_nan()))
            .collect();
        columns.push(Column::new((*name).into(), values));
    }

    columns.push(Column::new(
        QC_FLAG_COLUMN.into(),
        records
            .iter()
            .map(|r| i32::from(i8::from(r.qc_flag())))
            .collect::<Vec<i32>>(),
    ));
    columns.push(Column::new(
        QC_MESSAGE_COLUMN.into(),
        records
            .iter()
            .map(|r| r.qc_message_string())
            .collect::<Vec<String>>(),
    ));

    Ok(DataFrame::new(columns)?)
}
