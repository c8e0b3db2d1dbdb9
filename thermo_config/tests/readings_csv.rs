use std::fs::File;
use std::io::Write;

use chrono::NaiveDate;
use rstest::rstest;
use tempfile::tempdir;
use thermo_config::{
    FeatureRecord, ReadingRecord, load_feature_csv, load_readings_csv, write_feature_csv,
    write_readings_csv,
};

#[rstest]
#[case("recorded_time,temperature")]
#[case("timestamp,temp")]
#[case("time,value")]
#[case("RECORDED_TIME, svalue")]
fn header_synonyms_are_resolved(#[case] header: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("readings.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "{header}").unwrap();
    writeln!(f, "2025-05-06 10:00:00,21.0").unwrap();
    writeln!(f, "2025-05-06 10:05:00,21.5").unwrap();

    let out = load_readings_csv(&path).unwrap();
    assert_eq!(out.rows.len(), 2);
    assert_eq!(out.rows[1].temperature, Some(21.5));
    assert!(out.rows[0].recorded_time.is_some());
}

#[rstest]
fn missing_value_column_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad_headers.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "recorded_time,humidity").unwrap();
    writeln!(f, "2025-05-06 10:00:00,50").unwrap();

    let err = load_readings_csv(&path).expect_err("should error on missing value column");
    assert!(format!("{err}").contains("no temperature column"));
}

#[rstest]
#[case("2025-05-06 10:00:00,abc", "non-numeric temperature")]
#[case("not-a-time,21.0", "unparsable timestamp")]
fn bad_cells_report_row_number(#[case] line: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "recorded_time,temperature").unwrap();
    writeln!(f, "2025-05-06 09:55:00,20.0").unwrap();
    writeln!(f, "{line}").unwrap();

    let err = load_readings_csv(&path).expect_err("should error on bad cell");
    let msg = format!("{err}");
    assert!(msg.contains("invalid CSV row 3"), "{msg}");
    assert!(msg.contains(needle), "{msg}");
}

#[rstest]
fn nan_and_empty_cells_are_missing() {
    let csv = "sensor_id,recorded_time,temperature\na,2025-05-06 10:00:00,NaN\nb,2025-05-06 10:01:00,\n";
    let out = thermo_config::read_readings(csv.as_bytes()).unwrap();
    assert!(out.rows.iter().all(|r| r.temperature.is_none()));
    assert_eq!(out.rows[0].sensor_id, "a");
    assert_eq!(out.rows[1].sensor_id, "b");
}

#[rstest]
fn written_readings_load_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let t = NaiveDate::from_ymd_opt(2025, 5, 6)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let rows = vec![
        ReadingRecord {
            sensor_id: "kitchen".into(),
            recorded_time: Some(t),
            temperature: Some(22.25),
        },
        ReadingRecord {
            sensor_id: "kitchen".into(),
            recorded_time: Some(t + chrono::Duration::minutes(5)),
            temperature: None,
        },
    ];
    write_readings_csv(&path, &rows).unwrap();
    let back = load_readings_csv(&path).unwrap();
    assert_eq!(back.rows, rows);
}

#[rstest]
fn feature_table_booleans_are_zero_one() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("features.csv");
    let t = NaiveDate::from_ymd_opt(2025, 5, 6)
        .unwrap()
        .and_hms_opt(13, 30, 0)
        .unwrap();
    let row = FeatureRecord {
        recorded_time: t,
        hour: 13,
        minute: 30,
        day_of_week: 1,
        time_morning: false,
        time_afternoon: true,
        time_evening: false,
        time_night: false,
        temp_lag_1: 24.0,
        temp_lag_2: 23.5,
        temp_lag_3: 23.0,
        temp_diff_1: 0.5,
        temp_diff_2: 0.0,
        temperature: 24.5,
        temperature_scaled: 1.0,
        temp_lag_1_scaled: 1.0,
        temp_lag_2_scaled: 0.5,
        temp_lag_3_scaled: 0.0,
        temp_diff_1_scaled: 1.0,
        temp_diff_2_scaled: 0.0,
    };
    write_feature_csv(&path, std::slice::from_ref(&row)).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("recorded_time,hour,minute,day_of_week,time_morning"));
    assert!(header.ends_with("temp_diff_2_scaled"));
    let data = lines.next().unwrap();
    assert!(data.contains(",0,1,0,0,"), "booleans not 0/1: {data}");

    let back = load_feature_csv(&path).unwrap();
    assert_eq!(back, vec![row]);
}
