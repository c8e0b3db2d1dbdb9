use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rstest::rstest;
use thermo_core::dedup::{change_flags, runs};
use thermo_core::{DedupCfg, RunLengthDeduplicator, SensorReading, collapse};

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn at(min: i64) -> NaiveDateTime {
    t0() + Duration::minutes(min)
}

fn series(sensor: &str, values: &[f64]) -> Vec<SensorReading> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| SensorReading::new(sensor, at(i as i64), v))
        .collect()
}

#[test]
fn flat_run_collapses_to_first_reading() {
    let input = series("s1", &[20.0, 20.0, 20.0, 25.0]);
    let out = RunLengthDeduplicator::new(DedupCfg::default()).collapse(&input);
    assert_eq!(
        out,
        vec![
            SensorReading::new("s1", at(0), 20.0),
            SensorReading::new("s1", at(3), 25.0),
        ]
    );
}

#[rstest]
#[case(&[20.0, 20.0, 25.0], 3, 3)]
#[case(&[20.0, 20.0, 20.0], 3, 1)]
#[case(&[20.0, 20.0, 20.0], 4, 3)]
#[case(&[1.0, 2.0, 3.0], 1, 3)]
#[case(&[5.0, 5.0, 5.0, 5.0, 5.0, 6.0, 6.0], 2, 2)]
fn short_runs_are_kept_whole(#[case] values: &[f64], #[case] min_run: usize, #[case] kept: usize) {
    assert_eq!(collapse(&series("s", values), min_run, 1e-9).len(), kept);
}

#[test]
fn sensors_are_deduplicated_independently() {
    // interleaved arrival; each sensor alone has a run of three
    let mut input = Vec::new();
    for i in 0..3 {
        input.push(SensorReading::new("b", at(i), 30.0));
        input.push(SensorReading::new("a", at(i), 10.0));
    }
    let out = collapse(&input, 3, 1e-9);
    assert_eq!(
        out,
        vec![
            SensorReading::new("a", at(0), 10.0),
            SensorReading::new("b", at(0), 30.0),
        ]
    );
}

#[test]
fn readings_are_ordered_by_time_before_grouping() {
    let input = vec![
        SensorReading::new("s", at(2), 20.0),
        SensorReading::new("s", at(0), 20.0),
        SensorReading::new("s", at(3), 21.0),
        SensorReading::new("s", at(1), 20.0),
    ];
    let out = collapse(&input, 3, 1e-9);
    assert_eq!(
        out,
        vec![
            SensorReading::new("s", at(0), 20.0),
            SensorReading::new("s", at(3), 21.0),
        ]
    );
}

#[test]
fn tolerance_absorbs_jitter() {
    let input = series("s", &[20.0, 20.05, 19.98, 22.0]);
    assert_eq!(collapse(&input, 3, 0.1).len(), 2);
    assert_eq!(collapse(&input, 3, 1e-9).len(), 4);
}

#[test]
fn missing_values_are_never_merged() {
    let input = series("s", &[f64::NAN, f64::NAN, f64::NAN]);
    assert_eq!(collapse(&input, 3, 1e-9).len(), 3);
    assert_eq!(change_flags(&[1.0, f64::NAN, 1.0], 1e-9), vec![true, true, true]);
}

#[test]
fn empty_input() {
    assert!(collapse(&[], 3, 1e-9).is_empty());
}

fn small_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0u8..3).prop_map(f64::from), 0..60)
}

proptest! {
    #[test]
    fn runs_partition_the_sequence(values in small_values()) {
        let rs = runs(&values, 0.0);
        prop_assert_eq!(rs.iter().map(|r| r.len).sum::<usize>(), values.len());
        for w in rs.windows(2) {
            prop_assert_eq!(w[0].start + w[0].len, w[1].start);
            prop_assert!(w[0].value != w[1].value);
        }
    }

    #[test]
    fn no_long_run_survives(values in small_values(), min_run in 1usize..5) {
        let out = collapse(&series("s", &values), min_run, 0.0);
        let vals: Vec<f64> = out.iter().map(|r| r.value).collect();
        prop_assert!(out.len() <= values.len());
        for r in runs(&vals, 0.0) {
            prop_assert!(r.len == 1 || r.len < min_run);
        }
    }

    #[test]
    fn collapse_is_idempotent(values in small_values(), min_run in 1usize..5) {
        let once = collapse(&series("s", &values), min_run, 0.0);
        let twice = collapse(&once, min_run, 0.0);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn grouping_does_not_mix_sensors(a in small_values(), b in small_values()) {
        let mut input = series("a", &a);
        input.extend(series("b", &b));
        let together = collapse(&input, 3, 0.0);
        let mut separate = collapse(&series("a", &a), 3, 0.0);
        separate.extend(collapse(&series("b", &b), 3, 0.0));
        prop_assert_eq!(together, separate);
    }
}
