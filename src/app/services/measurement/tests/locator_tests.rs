use super::value;
use crate::app::services::measurement::MeasurementLocator;
use crate::app::services::sensor_config::InstrumentVariable;
use crate::app::services::sensor_values::tests::at;
use crate::app::services::sensor_values::{DatasetSensorValues, RunTypeTracker};

fn run_types() -> RunTypeTracker {
    let mut tracker = RunTypeTracker::new();
    tracker.add("EQU", at(0)).unwrap();
    tracker.add("EQU", at(20)).unwrap();
    tracker.add("STD1", at(30)).unwrap();
    tracker.add("STD1", at(40)).unwrap();
    tracker.add("EQU", at(50)).unwrap();
    tracker.finish();
    tracker
}

#[test]
fn test_one_measurement_per_distinct_time() {
    let values = DatasetSensorValues::from_values(
        1,
        vec![
            value(1, 6, 0, "400"),
            value(2, 6, 10, "401"),
            value(3, 7, 10, "402"),
            value(4, 6, 30, "250"),
            value(5, 6, 60, "403"),
        ],
    )
    .unwrap();
    let tracker = run_types();
    let variable = InstrumentVariable::new(1, "Underway Marine pCO₂");

    let located = MeasurementLocator::new(&values, &tracker).locate(1, &[(&variable, vec![6, 7])]);

    assert_eq!(located.len(), 4);
    let ids: Vec<i64> = located.measurements.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(located.measurements[2].time, at(30));
    assert_eq!(located.measurements[2].run_type.as_deref(), Some("STD1"));
    assert_eq!(located.for_variable(1).count(), 4);
}

#[test]
fn test_filters_by_measurement_run_type() {
    let values = DatasetSensorValues::from_values(
        1,
        vec![value(1, 6, 0, "400"), value(2, 6, 35, "250"), value(3, 6, 45, "401")],
    )
    .unwrap();
    let tracker = run_types();
    let variable = InstrumentVariable::new(1, "Underway Marine pCO₂").with_run_types(&["EQU"]);

    let located = MeasurementLocator::new(&values, &tracker).locate(1, &[(&variable, vec![6])]);

    // 45 s lies between periods and takes the next (EQU) period
    let times: Vec<_> = located.for_variable(1).map(|m| m.time).collect();
    assert_eq!(times, vec![at(0), at(45)]);
    assert_eq!(located.len(), 3);
}

#[test]
fn test_shared_times_create_one_measurement() {
    let values = DatasetSensorValues::from_values(
        1,
        vec![value(1, 1, 0, "1"), value(2, 2, 0, "2"), value(3, 2, 10, "3")],
    )
    .unwrap();
    let tracker = RunTypeTracker::new();
    let marine = InstrumentVariable::new(1, "Underway Marine pCO₂");
    let atmospheric = InstrumentVariable::new(2, "Underway Atmospheric pCO₂");

    let located = MeasurementLocator::new(&values, &tracker)
        .locate(1, &[(&marine, vec![1]), (&atmospheric, vec![2])]);

    assert_eq!(located.len(), 2);
    assert_eq!(located.for_variable(1).map(|m| m.id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(located.for_variable(2).map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(located.measurements.iter().all(|m| m.run_type.is_none()));
    assert!(located.get(2).is_some());
}
