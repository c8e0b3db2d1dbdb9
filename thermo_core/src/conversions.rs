//! Conversions between `thermo_config` records and `thermo_core` types.

use crate::calendar::{CalendarFeatures, TimeOfDay};
use crate::config::{DedupCfg, ForecastCfg, PreprocessCfg, SplitCfg};
use crate::error::PipelineError;
use crate::features::{FeatureRow, RawRow};
use crate::reading::SensorReading;

// ── DedupCfg ─────────────────────────────────────────────────────────────────

impl From<&thermo_config::DedupCfg> for DedupCfg {
    fn from(c: &thermo_config::DedupCfg) -> Self {
        Self {
            min_run: c.min_run,
            tol: c.tol,
        }
    }
}

// ── PreprocessCfg ────────────────────────────────────────────────────────────

impl From<&thermo_config::PreprocessCfg> for PreprocessCfg {
    fn from(c: &thermo_config::PreprocessCfg) -> Self {
        Self {
            min_temp: c.min_temp,
            max_temp: c.max_temp,
            flat_delta: c.flat_delta,
            flat_cap: c.flat_cap,
            min_rows: c.min_rows,
            filter_hours: None,
        }
    }
}

impl PreprocessCfg {
    /// Preprocessing knobs plus the load window from `[data]`.
    pub fn from_config(cfg: &thermo_config::Config) -> Self {
        Self {
            filter_hours: (cfg.data.filter_hours > 0).then_some(cfg.data.filter_hours),
            ..Self::from(&cfg.preprocess)
        }
    }
}

// ── SplitCfg ─────────────────────────────────────────────────────────────────

impl From<&thermo_config::SplitCfg> for SplitCfg {
    fn from(c: &thermo_config::SplitCfg) -> Self {
        Self {
            test_fraction: c.test_fraction,
            seed: c.seed,
        }
    }
}

// ── ForecastCfg ──────────────────────────────────────────────────────────────

impl From<&thermo_config::ForecastCfg> for ForecastCfg {
    fn from(c: &thermo_config::ForecastCfg) -> Self {
        Self {
            horizons: c.horizons.clone(),
        }
    }
}

// ── Readings ─────────────────────────────────────────────────────────────────

impl From<&thermo_config::ReadingRecord> for RawRow {
    fn from(r: &thermo_config::ReadingRecord) -> Self {
        Self {
            recorded_time: r.recorded_time,
            temperature: r.temperature,
        }
    }
}

/// Missing temperatures become NaN so dedup keeps them as their own runs.
impl TryFrom<&thermo_config::ReadingRecord> for SensorReading {
    type Error = PipelineError;

    fn try_from(r: &thermo_config::ReadingRecord) -> Result<Self, Self::Error> {
        let timestamp = r
            .recorded_time
            .ok_or(PipelineError::MissingColumn("recorded_time"))?;
        Ok(SensorReading::new(
            r.sensor_id.clone(),
            timestamp,
            r.temperature.unwrap_or(f64::NAN),
        ))
    }
}

impl From<&SensorReading> for thermo_config::ReadingRecord {
    fn from(r: &SensorReading) -> Self {
        Self {
            sensor_id: r.sensor_id.clone(),
            recorded_time: Some(r.timestamp),
            temperature: r.value.is_finite().then_some(r.value),
        }
    }
}

// ── Feature table ────────────────────────────────────────────────────────────

impl From<&FeatureRow> for thermo_config::FeatureRecord {
    fn from(r: &FeatureRow) -> Self {
        let [time_morning, time_afternoon, time_evening, time_night] =
            r.calendar.time_of_day.one_hot();
        Self {
            recorded_time: r.recorded_time,
            hour: r.calendar.hour,
            minute: r.calendar.minute,
            day_of_week: r.calendar.day_of_week,
            time_morning,
            time_afternoon,
            time_evening,
            time_night,
            temp_lag_1: r.temp_lag_1,
            temp_lag_2: r.temp_lag_2,
            temp_lag_3: r.temp_lag_3,
            temp_diff_1: r.temp_diff_1,
            temp_diff_2: r.temp_diff_2,
            temperature: r.temperature,
            temperature_scaled: r.temperature_scaled,
            temp_lag_1_scaled: r.temp_lag_1_scaled,
            temp_lag_2_scaled: r.temp_lag_2_scaled,
            temp_lag_3_scaled: r.temp_lag_3_scaled,
            temp_diff_1_scaled: r.temp_diff_1_scaled,
            temp_diff_2_scaled: r.temp_diff_2_scaled,
        }
    }
}

/// Rejects rows whose one-hot columns disagree with their hour.
impl TryFrom<&thermo_config::FeatureRecord> for FeatureRow {
    type Error = PipelineError;

    fn try_from(r: &thermo_config::FeatureRecord) -> Result<Self, Self::Error> {
        if r.hour > 23 || r.minute > 59 || r.day_of_week > 6 {
            return Err(PipelineError::InvalidData(format!(
                "calendar fields out of range at {}",
                r.recorded_time
            )));
        }
        let time_of_day = TimeOfDay::from_hour(r.hour);
        let stored = [r.time_morning, r.time_afternoon, r.time_evening, r.time_night];
        if stored != time_of_day.one_hot() {
            return Err(PipelineError::InvalidData(format!(
                "time-of-day columns {stored:?} do not match hour {} at {}",
                r.hour, r.recorded_time
            )));
        }
        Ok(Self {
            recorded_time: r.recorded_time,
            calendar: CalendarFeatures {
                hour: r.hour,
                minute: r.minute,
                day_of_week: r.day_of_week,
                time_of_day,
            },
            temp_lag_1: r.temp_lag_1,
            temp_lag_2: r.temp_lag_2,
            temp_lag_3: r.temp_lag_3,
            temp_diff_1: r.temp_diff_1,
            temp_diff_2: r.temp_diff_2,
            temperature: r.temperature,
            temperature_scaled: r.temperature_scaled,
            temp_lag_1_scaled: r.temp_lag_1_scaled,
            temp_lag_2_scaled: r.temp_lag_2_scaled,
            temp_lag_3_scaled: r.temp_lag_3_scaled,
            temp_diff_1_scaled: r.temp_diff_1_scaled,
            temp_diff_2_scaled: r.temp_diff_2_scaled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn filter_hours_zero_disables_window() {
        let mut cfg = thermo_config::Config::default();
        cfg.data.filter_hours = 0;
        assert_eq!(PreprocessCfg::from_config(&cfg).filter_hours, None);
        cfg.data.filter_hours = 6;
        assert_eq!(PreprocessCfg::from_config(&cfg).filter_hours, Some(6));
    }

    #[test]
    fn split_section_carries_over() {
        let mut cfg = thermo_config::Config::default();
        cfg.split.test_fraction = 0.3;
        cfg.split.seed = 7;
        assert_eq!(
            SplitCfg::from(&cfg.split),
            SplitCfg {
                test_fraction: 0.3,
                seed: 7
            }
        );
    }

    #[test]
    fn missing_reading_value_becomes_nan() {
        let rec = thermo_config::ReadingRecord {
            sensor_id: "s".into(),
            recorded_time: Some(ts(1)),
            temperature: None,
        };
        let r = SensorReading::try_from(&rec).unwrap();
        assert!(r.value.is_nan());
    }

    #[test]
    fn inconsistent_one_hot_is_rejected() {
        let row = FeatureRow {
            recorded_time: ts(9),
            calendar: CalendarFeatures::at(ts(9)),
            temp_lag_1: 0.0,
            temp_lag_2: 0.0,
            temp_lag_3: 0.0,
            temp_diff_1: 0.0,
            temp_diff_2: 0.0,
            temperature: 20.0,
            temperature_scaled: 0.0,
            temp_lag_1_scaled: 0.0,
            temp_lag_2_scaled: 0.0,
            temp_lag_3_scaled: 0.0,
            temp_diff_1_scaled: 0.0,
            temp_diff_2_scaled: 0.0,
        };
        let mut rec = thermo_config::FeatureRecord::from(&row);
        assert_eq!(FeatureRow::try_from(&rec).unwrap(), row);
        rec.time_night = true;
        assert!(matches!(
            FeatureRow::try_from(&rec),
            Err(PipelineError::InvalidData(_))
        ));
    }
}
