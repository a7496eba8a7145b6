//! Integration tests for the dataset pipeline
//!
//! Datasets are written as JSON the way an extraction step would produce
//! them, processed through the public API and exported to JSON, Parquet and
//! CSV in scratch directories.

use pco2_processor::app::services::export::{reduction_frame, write_frame, write_json};
use pco2_processor::app::services::pipeline::{DatasetInput, DatasetOutput, DatasetProcessor};
use pco2_processor::config::{CompressionAlgorithm, ExportFormat};
use pco2_processor::constants::sensor_types::*;
use pco2_processor::constants::variables::UNDERWAY_MARINE_PCO2;
use pco2_processor::{Flag, ProcessorConfig};
use polars::prelude::*;
use serde_json::{Value, json};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 2023-06-15 12:00:00 UTC
const BASE_MILLIS: i64 = 1_686_830_400_000;

/// Write a marine dataset with rows at `(seconds, intake temperature, run type)`
fn write_dataset(dir: &Path, name: &str, rows: &[(i64, &str, &str)], pre_flushing: i64) -> PathBuf {
    let mut sensor_values = Vec::new();
    for (row, (seconds, intake, run_type)) in rows.iter().enumerate() {
        let readings = [*intake, "35", "10.5", "1013.25", "0", "400", *run_type];
        for (column, raw) in readings.iter().enumerate() {
            sensor_values.push(json!({
                "id": row as i64 * 10 + column as i64 + 1,
                "file_column": column as i64 + 1,
                "date": BASE_MILLIS + seconds * 1000,
                "value": raw,
                "user_qc_flag": -10,
            }));
        }
    }

    let dataset = json!({
        "dataset_id": 42,
        "name": name,
        "instrument": {
            "id": 3,
            "name": "Research Vessel",
            "pre_flushing_seconds": pre_flushing,
            "assignments": [
                {"column_id": 1, "sensor_type": INTAKE_TEMPERATURE},
                {"column_id": 2, "sensor_type": SALINITY},
                {"column_id": 3, "sensor_type": EQUILIBRATOR_TEMPERATURE},
                {"column_id": 4, "sensor_type": EQUILIBRATOR_PRESSURE_ABSOLUTE},
                {"column_id": 5, "sensor_type": XH2O},
                {"column_id": 6, "sensor_type": XCO2, "depends_question_answer": true},
                {"column_id": 7, "sensor_type": RUN_TYPE},
            ],
            "variables": [
                {"id": 1, "name": UNDERWAY_MARINE_PCO2, "measurement_run_types": ["EQU"]},
            ],
        },
        "sensor_values": sensor_values,
    });

    let path = dir.join(format!("{}.json", name));
    std::fs::write(&path, serde_json::to_string_pretty(&dataset).unwrap()).unwrap();
    path
}

fn process_file(path: &Path) -> pco2_processor::app::services::pipeline::ProcessedDataset {
    let config = ProcessorConfig::default();
    let graph = config.graph().unwrap();
    let input = DatasetInput::from_path(path).unwrap();
    DatasetProcessor::new(&config, &graph).process(input).unwrap()
}

#[test]
fn test_pipeline_to_json_output() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let path = write_dataset(
        input_dir.path(),
        "cruise",
        &[(0, "10.0", "EQU"), (60, "13.0", "EQU"), (120, "10.0", "EQU")],
        0,
    );

    let processed = process_file(&path);
    let json_path = output_dir.path().join("cruise.reduced.json");
    let size = write_json(&processed.output, &json_path).unwrap();
    assert!(size > 0);

    let contents = std::fs::read_to_string(&json_path).unwrap();
    let output: DatasetOutput = serde_json::from_str(&contents).unwrap();
    assert_eq!(output, processed.output);
    assert_eq!(output.dataset_id, 42);
    assert_eq!(output.measurements.len(), 3);
    assert_eq!(output.measurements[0].date, BASE_MILLIS);

    let flags: Vec<i8> = output.data_reduction.iter().map(|r| r.qc_flag).collect();
    assert_eq!(
        flags,
        vec![
            i8::from(Flag::Good),
            i8::from(Flag::Questionable),
            i8::from(Flag::Good)
        ]
    );
    assert_eq!(output.data_reduction[1].qc_message, "ΔT out of range");

    let values: Value = serde_json::from_str(&output.data_reduction[1].calculation_values).unwrap();
    let delta_t = values["ΔT"].as_f64().unwrap();
    assert!((delta_t - 2.5).abs() < 1e-9);

    // Only the readings behind the questionable record are written back
    assert!(output.sensor_values.iter().all(|v| (11..=17).contains(&v.id)));
    assert!(output.sensor_values.iter().any(|v| v.id == 11 && v.value == "13.0"));
}

#[test]
fn test_pipeline_to_parquet_export() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let path = write_dataset(
        input_dir.path(),
        "cruise",
        &[(0, "10.0", "EQU"), (60, "10.0", "EQU"), (120, "10.0", "EQU")],
        0,
    );

    let processed = process_file(&path);
    let mut frame = reduction_frame(&processed.measurements, &processed.records).unwrap();
    let parquet_path = output_dir.path().join("cruise.reduced.parquet");
    write_frame(
        &mut frame,
        &parquet_path,
        ExportFormat::Parquet,
        CompressionAlgorithm::Zstd,
    )
    .unwrap();

    let read = ParquetReader::new(File::open(&parquet_path).unwrap())
        .finish()
        .unwrap();
    assert_eq!(read.height(), 3);

    let delta_t = read.column("ΔT").unwrap().f64().unwrap();
    assert!(delta_t.into_iter().all(|v| v.is_some_and(|v| (v - 0.5).abs() < 1e-9)));

    let fco2 = read.column("fCO₂").unwrap().f64().unwrap();
    assert_eq!(fco2.null_count(), 0);
    assert!(fco2.into_iter().flatten().all(|v| v > 300.0 && v < 420.0));

    let flags = read.column("qc_flag").unwrap().i32().unwrap();
    assert!(flags.into_iter().all(|f| f == Some(2)));
}

#[test]
fn test_flushing_dataset_to_csv_export() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let path = write_dataset(
        input_dir.path(),
        "flushing",
        &[(0, "10.0", "EQU"), (60, "10.0", "EQU"), (120, "10.0", "EQU")],
        30,
    );

    let processed = process_file(&path);
    assert_eq!(processed.records[0].qc_flag(), Flag::NoQc);

    let mut frame = reduction_frame(&processed.measurements, &processed.records).unwrap();
    let csv_path = output_dir.path().join("flushing.reduced.csv");
    write_frame(
        &mut frame,
        &csv_path,
        ExportFormat::Csv,
        CompressionAlgorithm::Snappy,
    )
    .unwrap();

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("measurement_id,variable_id,date,"));
    assert!(lines[0].ends_with("qc_flag,qc_message"));
    assert!(lines[1].contains(&format!("Missing {}", XCO2)));

    // Flushing flags are written back for the whole first row
    assert_eq!(processed.output.sensor_values.len(), 7);
    assert!(
        processed
            .output
            .sensor_values
            .iter()
            .all(|v| v.user_qc_flag == i8::from(Flag::Flushing))
    );
}

#[test]
fn test_processing_a_file_is_deterministic() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let path = write_dataset(
        input_dir.path(),
        "cruise",
        &[(0, "10.0", "EQU"), (60, "13.0", "ATM"), (120, "10.0", "EQU"), (180, "10.2", "EQU")],
        0,
    );

    let first_path = output_dir.path().join("first.json");
    let second_path = output_dir.path().join("second.json");
    write_json(&process_file(&path).output, &first_path).unwrap();
    write_json(&process_file(&path).output, &second_path).unwrap();

    assert_eq!(
        std::fs::read_to_string(&first_path).unwrap(),
        std::fs::read_to_string(&second_path).unwrap()
    );

    // The ATM row is located but not reduced
    let output: DatasetOutput =
        serde_json::from_str(&std::fs::read_to_string(&first_path).unwrap()).unwrap();
    assert_eq!(output.measurements.len(), 4);
    let reduced: Vec<i64> = output.data_reduction.iter().map(|r| r.measurement_id).collect();
    assert_eq!(reduced, vec![1, 3, 4]);
}
