//! Synthetic diurnal readings: a sine peaking mid-afternoon, a slow
//! day-to-day offset and Gaussian measurement noise.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use eyre::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::path::Path;

use super::report;
use crate::error_fmt::ConfigError;

const BASE_TEMP: f64 = 22.0;
const AMPLITUDE: f64 = 5.0;
const DAY_STEP: f64 = 0.5;
const NOISE_STD: f64 = 0.5;
/// Upper bound for `--days`.
pub const MAX_DAYS: u32 = 3660;

pub struct GenerateArgs<'a> {
    pub days: u32,
    pub readings_per_hour: u32,
    pub seed: u64,
    pub end: Option<&'a str>,
    pub sensor_id: &'a str,
    pub output: &'a Path,
}

/// Noise-free value at `t`.
pub fn expected_temperature(t: NaiveDateTime) -> f64 {
    let hour = f64::from(t.hour()) + f64::from(t.minute()) / 60.0;
    let cycle = ((hour - 6.0).rem_euclid(24.0) * PI / 12.0).sin();
    let day_offset = f64::from(t.date().num_days_from_ce().rem_euclid(7)) * DAY_STEP;
    BASE_TEMP + AMPLITUDE * cycle + day_offset
}

// Box-Muller; 1 - u keeps the log argument in (0, 1]
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.r#gen::<f64>();
    let u2: f64 = rng.r#gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Timestamp `i` steps before `end`, in i64 milliseconds.
fn steps_before(end: NaiveDateTime, step_ms: i64, i: i64) -> NaiveDateTime {
    end - Duration::milliseconds(step_ms * i)
}

pub fn series(
    end: NaiveDateTime,
    days: u32,
    readings_per_hour: u32,
    seed: u64,
    sensor_id: &str,
) -> Vec<thermo_config::ReadingRecord> {
    let step_ms = 3_600_000 / i64::from(readings_per_hour);
    let total = i64::from(days) * 24 * i64::from(readings_per_hour);
    let mut rng = StdRng::seed_from_u64(seed);
    (0..total)
        .rev()
        .map(|i| {
            let t = steps_before(end, step_ms, i);
            let value = expected_temperature(t) + standard_normal(&mut rng) * NOISE_STD;
            thermo_config::ReadingRecord {
                sensor_id: sensor_id.to_string(),
                recorded_time: Some(t),
                temperature: Some((value * 100.0).round() / 100.0),
            }
        })
        .collect()
}

pub fn run(json: bool, args: &GenerateArgs<'_>) -> Result<()> {
    if !(1..=MAX_DAYS).contains(&args.days) {
        return Err(ConfigError(format!("--days must be in 1..={MAX_DAYS}")).into());
    }
    if !(1..=3600).contains(&args.readings_per_hour) {
        return Err(ConfigError("--readings-per-hour must be in 1..=3600".into()).into());
    }
    let end = match args.end {
        Some(s) => thermo_config::parse_timestamp(s)
            .ok_or_else(|| ConfigError(format!("--end is not a timestamp: {s:?}")))?,
        None => {
            let now = chrono::Local::now().naive_local();
            now.with_minute(0)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(now)
        }
    };

    let rows = series(end, args.days, args.readings_per_hour, args.seed, args.sensor_id);
    thermo_config::write_readings_csv(args.output, &rows)?;
    tracing::info!(
        rows = rows.len(),
        end = %end,
        seed = args.seed,
        "synthetic readings written"
    );

    let first = rows.first().and_then(|r| r.recorded_time);
    report(
        json,
        serde_json::json!({
            "command": "generate",
            "output": args.output.display().to_string(),
            "rows": rows.len(),
            "start": first,
            "end": end,
        }),
        || {
            format!(
                "wrote {} readings from {} to {} -> {}",
                rows.len(),
                first.map(|t| t.to_string()).unwrap_or_default(),
                end,
                args.output.display()
            )
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn peak_is_mid_afternoon() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let at = |h| expected_temperature(day.and_hms_opt(h, 0, 0).unwrap());
        assert!(at(12) > at(6));
        assert!(at(12) > at(0));
        // sin peaks six hours after 06:00
        assert!((at(12) - at(6) - AMPLITUDE).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_series() {
        let end = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let a = series(end, 1, 4, 9, "s");
        assert_eq!(a.len(), 96);
        assert_eq!(a, series(end, 1, 4, 9, "s"));
        assert_eq!(a.last().unwrap().recorded_time, Some(end));
        assert_eq!(
            a[0].recorded_time,
            Some(end - Duration::minutes(95 * 15))
        );
    }

    #[test]
    fn offsets_past_i32_do_not_wrap() {
        let end = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let i = i64::from(i32::MAX) + 10;
        assert_eq!(steps_before(end, 1_000, i), end - Duration::seconds(i));
    }

    #[test]
    fn days_are_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.csv");
        let args = GenerateArgs {
            days: MAX_DAYS + 1,
            readings_per_hour: 12,
            seed: 1,
            end: None,
            sensor_id: "s",
            output: &output,
        };
        let err = run(false, &args).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
        assert!(!output.exists());
    }
}
