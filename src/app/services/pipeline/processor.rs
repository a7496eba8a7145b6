//! Main DatasetProcessor struct and pipeline orchestration

use super::{DatasetInput, DatasetOutput, DatasetStats};
use crate::ProcessorConfig;
use crate::app::models::records::{
    DataReductionRow, MeasurementRecord, MeasurementValueRecord, SensorValueRecord,
};
use crate::app::models::{
    ColumnId, DataReductionRecord, Measurement, MeasurementId, SensorValueId,
};
use crate::app::services::calibration::{CalibrationSet, apply_sensor_calibrations};
use crate::app::services::measurement::{MeasurementAssembler, MeasurementLocator, MeasurementValues};
use crate::app::services::qc::{ParameterRangeRoutine, QcRunner};
use crate::app::services::reduction::{DataReducer, reduce, reducer_for, resolve_required_sensor_types};
use crate::app::services::sensor_config::{Instrument, InstrumentVariable, SensorTypeGraph};
use crate::app::services::sensor_values::{
    DatasetSensorValues, RunTypeTracker, apply_flushing_flags,
};
use crate::Result;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, error, info};

/// Everything one processing pass produced
#[derive(Debug, Clone)]
pub struct ProcessedDataset {
    pub output: DatasetOutput,
    /// Every located measurement, in id order
    pub measurements: Vec<Measurement>,
    /// Records in variable then measurement order
    pub records: Vec<DataReductionRecord>,
    pub stats: DatasetStats,
}

/// Processes datasets against one configuration and sensor type graph
pub struct DatasetProcessor<'a> {
    config: &'a ProcessorConfig,
    graph: &'a SensorTypeGraph,
}

impl<'a> DatasetProcessor<'a> {
    pub fn new(config: &'a ProcessorConfig, graph: &'a SensorTypeGraph) -> Self {
        Self { config, graph }
    }

    /// Run the full pass over one dataset
    ///
    /// Configuration problems (an invalid instrument, a variable without a
    /// reducer, a sensor type that cannot be resolved) abort the dataset
    /// before anything is calculated. Calculation failures only degrade the
    /// affected record.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration or malformed sensor values
    pub fn process(&self, input: DatasetInput) -> Result<ProcessedDataset> {
        let instrument = &input.instrument;
        instrument.validate(self.graph)?;

        let reducers = self.build_reducers(instrument)?;
        let mut stats = DatasetStats::new();

        // Load and calibrate
        let raw_values: HashMap<SensorValueId, String> = input
            .sensor_values
            .iter()
            .map(|record| (record.id, record.value.clone()))
            .collect();
        let mut values = DatasetSensorValues::from_values(input.dataset_id, input.sensor_values()?)?;
        stats.sensor_values = values.len();
        stats.missing = values.clear_missing_values(&instrument.assignments);

        let calibrations = CalibrationSet::from_calibrations(input.calibrations.iter().cloned())?;
        stats.calibrated = apply_sensor_calibrations(&mut values, &calibrations);
        let calibrated: Vec<SensorValueId> = values.changes().iter().collect();
        values.mark_written(calibrated);

        // Run types and flushing
        let tracker = self.run_type_tracker(instrument, &values)?;
        stats.run_type_periods = tracker.len();
        stats.flushing = apply_flushing_flags(
            &mut values,
            &tracker,
            instrument.pre_flushing_seconds,
            instrument.post_flushing_seconds,
        );

        // Sensor QC
        stats.sensor_qc =
            QcRunner::new(self.graph, instrument, &tracker).run(&mut values, &self.config.qc.routines);

        // Measurements
        let core_columns: Vec<(&InstrumentVariable, Vec<ColumnId>)> = reducers
            .iter()
            .map(|reducer| {
                let columns = self.core_columns(instrument, reducer.as_ref());
                (reducer.variable(), columns)
            })
            .collect();
        let located = MeasurementLocator::new(&values, &tracker).locate(input.dataset_id, &core_columns);
        stats.measurements = located.len();

        // Assembly and reduction
        let mut reduced: Vec<(MeasurementValues, DataReductionRecord)> = Vec::new();
        {
            let assembler = MeasurementAssembler::new(self.graph, instrument, &values)
                .with_good_flags_only(self.config.assembly.good_flags_only);

            for reducer in &reducers {
                let variable = reducer.variable();
                let required = reducer.required_sensor_types();
                for measurement in located.for_variable(variable.id) {
                    let measurement_values = assembler.assemble_all(measurement, variable, &required)?;
                    let record = reduce(reducer.as_ref(), &measurement_values, &calibrations);
                    reduced.push((measurement_values, record));
                }
                debug!("Reduced variable '{}'", variable.name);
            }
        }

        // Post-reduction QC
        for reducer in &reducers {
            let variable = reducer.variable();
            for routine in self.data_reduction_routines(&variable.name) {
                for (measurement_values, record) in reduced
                    .iter_mut()
                    .filter(|(_, record)| record.variable_id == variable.id)
                {
                    if routine.apply(record, measurement_values, &mut values) {
                        stats.records_flagged += 1;
                    }
                }
            }
        }

        // Outputs
        let mut link_keys: BTreeSet<(MeasurementId, ColumnId, SensorValueId, Option<SensorValueId>)> =
            BTreeSet::new();
        let mut measurement_values = Vec::new();
        let mut data_reduction = Vec::with_capacity(reduced.len());
        let mut records = Vec::with_capacity(reduced.len());

        for (assembled, record) in reduced {
            for value in assembled.iter() {
                for link in MeasurementValueRecord::from_measurement_value(value) {
                    let key = (link.measurement_id, link.file_column_id, link.prior, link.post);
                    if link_keys.insert(key) {
                        measurement_values.push(link);
                    }
                }
            }
            stats.add_record(&record);
            data_reduction.push(DataReductionRow::from_record(&record)?);
            records.push(record);
        }

        let sensor_values = values
            .pending_writes()
            .iter()
            .map(|value| {
                let mut record = SensorValueRecord::from_sensor_value(value)?;
                if let Some(raw) = raw_values.get(&value.id) {
                    record.value = raw.clone();
                }
                Ok(record)
            })
            .collect::<Result<Vec<_>>>()?;
        stats.pending_writes = sensor_values.len();

        info!("Dataset '{}': {}", input.name, stats.summary());

        Ok(ProcessedDataset {
            output: DatasetOutput {
                dataset_id: input.dataset_id,
                name: input.name.clone(),
                measurements: located.measurements.iter().map(MeasurementRecord::from).collect(),
                measurement_values,
                data_reduction,
                sensor_values,
            },
            measurements: located.measurements,
            records,
            stats,
        })
    }

    /// A reducer per instrument variable, with its sensor types resolved
    fn build_reducers(&self, instrument: &Instrument) -> Result<Vec<Box<dyn DataReducer>>> {
        instrument
            .variables
            .iter()
            .map(|variable| {
                let reducer = reducer_for(variable)?;
                let resolved = resolve_required_sensor_types(
                    self.graph,
                    &instrument.assignments,
                    &variable.name,
                    &reducer.required_sensor_types(),
                )?;
                debug!(
                    "Variable '{}' uses sensor types: {}",
                    variable.name,
                    resolved.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
                );
                Ok(reducer)
            })
            .collect()
    }

    fn run_type_tracker(
        &self,
        instrument: &Instrument,
        values: &DatasetSensorValues,
    ) -> Result<RunTypeTracker> {
        let run_type_values = instrument
            .assignments
            .run_type_column()
            .and_then(|column_id| values.column(column_id))
            .into_iter()
            .flat_map(|index| index.iter());
        RunTypeTracker::from_values(run_type_values)
    }

    /// Columns of a reducer's core sensor types; a parent type contributes
    /// its children's columns
    fn core_columns(&self, instrument: &Instrument, reducer: &dyn DataReducer) -> Vec<ColumnId> {
        let mut columns = Vec::new();
        for name in reducer.core_sensor_types() {
            match self.graph.by_name(name) {
                Ok(sensor_type) if self.graph.is_parent(sensor_type) => {
                    for child in self.graph.children(sensor_type) {
                        columns.extend(instrument.assignments.column_ids(&child.name));
                    }
                }
                _ => columns.extend(instrument.assignments.column_ids(name)),
            }
        }
        columns
    }

    /// Post-reduction routines for a variable; misconfigured ones are skipped
    fn data_reduction_routines(&self, variable: &str) -> Vec<ParameterRangeRoutine> {
        self.config
            .qc
            .data_reduction_routines_for(variable)
            .filter_map(|settings| match ParameterRangeRoutine::from_settings(settings) {
                Ok(routine) => Some(routine),
                Err(e) => {
                    error!(
                        "Data reduction QC on '{}' for {} skipped: {}",
                        settings.parameter, variable, e
                    );
                    None
                }
            })
            .collect()
    }
}
