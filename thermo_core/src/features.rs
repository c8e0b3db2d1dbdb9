//! Feature construction for supervised training.
//!
//! `FeatureBuilder` walks `Empty -> Loaded -> Preprocessed`. Each step checks
//! the state it needs and fails with `PipelineError::Unready` otherwise, so a
//! stale table is never silently reused.
//!
//! Preprocessing stages, in order:
//! 1. sort by time (fails without timestamps)
//! 2. linear interpolation of missing temperatures
//! 3. physical-range filter
//! 4. calendar features and time-of-day one-hot
//! 5. lag features (row offsets, not wall-clock offsets)
//! 6. first and second differences
//! 7. prune rows left incomplete by 5-6
//! 8. flatline cap on consecutive unchanged rows
//! 9. min-max scaling of the numeric columns

use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::calendar::{CALENDAR_FEATURES, CalendarFeatures};
use crate::config::PreprocessCfg;
use crate::dedup::run_ids;
use crate::error::{PipelineError, Result};
use crate::reading::SensorReading;
use crate::scaler::ScalerState;

/// Numeric columns that get a `_scaled` counterpart, in table order.
pub const SCALED_COLUMNS: [&str; 6] = [
    "temperature",
    "temp_lag_1",
    "temp_lag_2",
    "temp_lag_3",
    "temp_diff_1",
    "temp_diff_2",
];

/// Largest lag; also the number of leading rows stage 7 removes.
const MAX_LAG: usize = 3;

/// One row of the raw table as loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub recorded_time: Option<NaiveDateTime>,
    /// `None` marks a gap for stage 2.
    pub temperature: Option<f64>,
}

impl From<&SensorReading> for RawRow {
    fn from(r: &SensorReading) -> Self {
        Self {
            recorded_time: Some(r.timestamp),
            temperature: r.value.is_finite().then_some(r.value),
        }
    }
}

/// Where `load` reads from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Readings CSV resolved through column synonyms.
    Csv(PathBuf),
    /// Rows already in memory (e.g. deduplicated readings or query results).
    Rows(Vec<RawRow>),
}

impl From<&[SensorReading]> for DataSource {
    fn from(readings: &[SensorReading]) -> Self {
        DataSource::Rows(readings.iter().map(RawRow::from).collect())
    }
}

/// One training example.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub recorded_time: NaiveDateTime,
    pub calendar: CalendarFeatures,
    pub temp_lag_1: f64,
    pub temp_lag_2: f64,
    pub temp_lag_3: f64,
    pub temp_diff_1: f64,
    pub temp_diff_2: f64,
    /// Label.
    pub temperature: f64,
    pub temperature_scaled: f64,
    pub temp_lag_1_scaled: f64,
    pub temp_lag_2_scaled: f64,
    pub temp_lag_3_scaled: f64,
    pub temp_diff_1_scaled: f64,
    pub temp_diff_2_scaled: f64,
}

impl FeatureRow {
    /// Unscaled values in `SCALED_COLUMNS` order.
    pub fn unscaled(&self) -> [f64; 6] {
        [
            self.temperature,
            self.temp_lag_1,
            self.temp_lag_2,
            self.temp_lag_3,
            self.temp_diff_1,
            self.temp_diff_2,
        ]
    }

    fn set_scaled(&mut self, s: [f64; 6]) {
        self.temperature_scaled = s[0];
        self.temp_lag_1_scaled = s[1];
        self.temp_lag_2_scaled = s[2];
        self.temp_lag_3_scaled = s[3];
        self.temp_diff_1_scaled = s[4];
        self.temp_diff_2_scaled = s[5];
    }

    /// Model input in `CALENDAR_FEATURES` order; the only subset known at inference.
    pub fn calendar_vector(&self) -> Vec<f64> {
        self.calendar.to_vector()
    }
}

/// Calendar design matrix and raw-temperature labels for a model fit.
pub fn calendar_design(rows: &[FeatureRow]) -> (Vec<Vec<f64>>, Vec<f64>) {
    rows.iter()
        .map(|r| (r.calendar_vector(), r.temperature))
        .unzip()
}

/// Names matching `calendar_design` columns.
pub fn calendar_feature_names() -> Vec<String> {
    CALENDAR_FEATURES.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Empty,
    Loaded {
        raw: Vec<RawRow>,
    },
    Preprocessed {
        raw: Vec<RawRow>,
        table: Vec<FeatureRow>,
        scaler: ScalerState,
    },
}

#[derive(Debug)]
pub struct FeatureBuilder {
    source: Option<DataSource>,
    cfg: PreprocessCfg,
    state: State,
}

impl FeatureBuilder {
    pub fn new(source: Option<DataSource>, cfg: PreprocessCfg) -> Self {
        Self {
            source,
            cfg,
            state: State::Empty,
        }
    }

    pub fn cfg(&self) -> &PreprocessCfg {
        &self.cfg
    }

    /// "empty", "loaded" or "preprocessed".
    pub fn state_name(&self) -> &'static str {
        match self.state {
            State::Empty => "empty",
            State::Loaded { .. } => "loaded",
            State::Preprocessed { .. } => "preprocessed",
        }
    }

    pub fn raw(&self) -> Option<&[RawRow]> {
        match &self.state {
            State::Empty => None,
            State::Loaded { raw } | State::Preprocessed { raw, .. } => Some(raw),
        }
    }

    pub fn table(&self) -> Option<&[FeatureRow]> {
        match &self.state {
            State::Preprocessed { table, .. } => Some(table),
            _ => None,
        }
    }

    pub fn scaler(&self) -> Option<&ScalerState> {
        match &self.state {
            State::Preprocessed { scaler, .. } => Some(scaler),
            _ => None,
        }
    }

    /// Consume a preprocessed builder into its table and fitted scaler.
    pub fn into_parts(self) -> Result<(Vec<FeatureRow>, ScalerState)> {
        match self.state {
            State::Preprocessed { table, scaler, .. } => Ok((table, scaler)),
            _ => Err(PipelineError::Unready("preprocess() has not run")),
        }
    }

    /// Read the configured source into the raw table. Reloading resets any
    /// previous preprocessing.
    pub fn load(&mut self) -> Result<&[RawRow]> {
        let Some(source) = &self.source else {
            tracing::error!("no data source configured");
            return Err(PipelineError::Config("no data source configured".into()));
        };
        let mut raw = match source {
            DataSource::Csv(path) => {
                tracing::info!(path = %path.display(), "loading readings CSV");
                read_csv_source(path)?
            }
            DataSource::Rows(rows) => rows.clone(),
        };
        tracing::info!(rows = raw.len(), "loaded raw table");

        if let Some(hours) = self.cfg.filter_hours {
            raw = keep_recent(raw, hours);
            tracing::info!(rows = raw.len(), hours, "kept most recent window");
        }
        if raw.len() < self.cfg.min_rows {
            tracing::warn!(
                rows = raw.len(),
                min_rows = self.cfg.min_rows,
                "very few rows loaded; continuing, but check input data quality"
            );
        }

        self.state = State::Loaded { raw };
        self.raw().ok_or(PipelineError::Unready("load() has not run"))
    }

    /// Run all stages over the loaded raw table and fit the scaler.
    pub fn preprocess(&mut self) -> Result<&[FeatureRow]> {
        let raw = match std::mem::take(&mut self.state) {
            State::Empty => return Err(PipelineError::Unready("load() has not run")),
            State::Loaded { raw } | State::Preprocessed { raw, .. } => raw,
        };
        let built = build_table(&raw, &self.cfg);
        let (table, scaler) = match built {
            Ok(v) => v,
            Err(e) => {
                // keep the raw table so the caller can inspect or retry
                self.state = State::Loaded { raw };
                return Err(e);
            }
        };
        self.state = State::Preprocessed { raw, table, scaler };
        self.table()
            .ok_or(PipelineError::Unready("preprocess() has not run"))
    }

    /// Random i.i.d. train/test partition. No temporal ordering is preserved:
    /// test rows may precede training rows in time.
    pub fn split(&self, test_fraction: f64, seed: u64) -> Result<(Vec<FeatureRow>, Vec<FeatureRow>)> {
        let Some(table) = self.table() else {
            return Err(PipelineError::Unready("preprocess() has not run"));
        };
        split_rows(table, test_fraction, seed)
    }
}

/// Shuffle with a seeded RNG; the test side gets `ceil(n * test_fraction)` rows.
pub fn split_rows(
    rows: &[FeatureRow],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<FeatureRow>, Vec<FeatureRow>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::Config(format!(
            "test_fraction must be in (0.0, 1.0), got {test_fraction}"
        )));
    }
    let n = rows.len();
    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let mut idx: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);

    let test = idx[..n_test].iter().map(|&i| rows[i].clone()).collect();
    let train: Vec<FeatureRow> = idx[n_test..].iter().map(|&i| rows[i].clone()).collect();
    tracing::info!(train = train.len(), test = n_test, "split table");
    Ok((train, test))
}

fn read_csv_source(path: &std::path::Path) -> Result<Vec<RawRow>> {
    if !path.exists() {
        return Err(PipelineError::Io(format!("{} not found", path.display())));
    }
    let csv = thermo_config::load_readings_csv(path).map_err(|e| {
        if e.downcast_ref::<thermo_config::UnresolvedColumn>().is_some() {
            PipelineError::Config(e.to_string())
        } else {
            PipelineError::InvalidData(e.to_string())
        }
    })?;
    if csv.time_column.is_none() {
        tracing::warn!(path = %path.display(), "readings CSV has no time column");
    }
    Ok(csv.rows.iter().map(RawRow::from).collect())
}

/// Keep rows within `hours` of the newest timestamp. Rows without a
/// timestamp are left for stage 1 to reject.
fn keep_recent(raw: Vec<RawRow>, hours: u32) -> Vec<RawRow> {
    let Some(max_t) = raw.iter().filter_map(|r| r.recorded_time).max() else {
        return raw;
    };
    let cutoff = max_t - Duration::hours(i64::from(hours));
    raw.into_iter()
        .filter(|r| r.recorded_time.is_none_or(|t| t >= cutoff))
        .collect()
}

/// Stage 1: every row needs a timestamp; stable sort ascending.
fn sort_by_time(raw: &[RawRow]) -> Result<Vec<(NaiveDateTime, Option<f64>)>> {
    if !raw.is_empty() && raw.iter().all(|r| r.recorded_time.is_none()) {
        return Err(PipelineError::MissingColumn("recorded_time"));
    }
    let mut rows = Vec::with_capacity(raw.len());
    for (i, r) in raw.iter().enumerate() {
        let Some(t) = r.recorded_time else {
            return Err(PipelineError::InvalidData(format!("row {i} has no timestamp")));
        };
        rows.push((t, r.temperature));
    }
    rows.sort_by_key(|(t, _)| *t);
    Ok(rows)
}

/// Stage 2: fill interior gaps linearly by row position; trailing gaps take
/// the last observed value; leading gaps stay missing (stage 3 drops them).
/// Returns the number of cells filled.
pub fn interpolate(values: &mut [Option<f64>]) -> usize {
    let mut filled = 0;
    let mut last: Option<(usize, f64)> = None;
    let mut i = 0;
    while i < values.len() {
        if let Some(v) = values[i] {
            last = Some((i, v));
            i += 1;
            continue;
        }
        let gap_end = (i..values.len())
            .find(|&j| values[j].is_some())
            .unwrap_or(values.len());
        if let Some((p, pv)) = last {
            let next = values.get(gap_end).copied().flatten();
            for (j, slot) in values.iter_mut().enumerate().take(gap_end).skip(i) {
                *slot = Some(match next {
                    Some(nv) => pv + (nv - pv) * ((j - p) as f64) / ((gap_end - p) as f64),
                    None => pv,
                });
                filled += 1;
            }
        }
        i = gap_end;
    }
    filled
}

/// Stage 8: run-local count of consecutive unchanged rows (0 for changed rows).
pub fn unchanged_counts(temps: &[f64], flat_delta: f64) -> Vec<usize> {
    let unchanged: Vec<bool> = temps
        .iter()
        .enumerate()
        .map(|(i, &t)| i > 0 && (t - temps[i - 1]).abs() < flat_delta)
        .collect();
    // group consecutive equal flags, then cumulative-sum the flag inside each group
    let flips: Vec<bool> = unchanged
        .iter()
        .enumerate()
        .map(|(i, &u)| i == 0 || u != unchanged[i - 1])
        .collect();
    let ids = run_ids(&flips);
    let mut out = Vec::with_capacity(temps.len());
    let mut count = 0usize;
    for (i, &u) in unchanged.iter().enumerate() {
        if i > 0 && ids[i] != ids[i - 1] {
            count = 0;
        }
        count += usize::from(u);
        out.push(count);
    }
    out
}

fn build_table(raw: &[RawRow], cfg: &PreprocessCfg) -> Result<(Vec<FeatureRow>, ScalerState)> {
    tracing::info!(rows = raw.len(), "preprocessing start");

    // 1
    let sorted = sort_by_time(raw)?;
    let (times, mut temps): (Vec<NaiveDateTime>, Vec<Option<f64>>) = sorted.into_iter().unzip();

    // 2
    let missing = temps.iter().filter(|t| t.is_none()).count();
    if missing > 0 {
        let filled = interpolate(&mut temps);
        tracing::warn!(missing, filled, "interpolated missing temperatures");
    }

    // 3
    let in_range: Vec<(NaiveDateTime, f64)> = times
        .into_iter()
        .zip(temps)
        .filter_map(|(t, v)| v.map(|v| (t, v)))
        .filter(|(_, v)| (cfg.min_temp..=cfg.max_temp).contains(v))
        .collect();
    tracing::info!(
        kept = in_range.len(),
        dropped = raw.len() - in_range.len(),
        min_temp = cfg.min_temp,
        max_temp = cfg.max_temp,
        "physical-range filter"
    );

    // 4-7
    let temps: Vec<f64> = in_range.iter().map(|(_, v)| *v).collect();
    let diff_1 = |i: usize| temps[i] - temps[i - 1];
    let mut table: Vec<FeatureRow> = (MAX_LAG..in_range.len())
        .map(|i| {
            let (t, v) = in_range[i];
            FeatureRow {
                recorded_time: t,
                calendar: CalendarFeatures::at(t),
                temp_lag_1: temps[i - 1],
                temp_lag_2: temps[i - 2],
                temp_lag_3: temps[i - 3],
                temp_diff_1: diff_1(i),
                temp_diff_2: diff_1(i) - diff_1(i - 1),
                temperature: v,
                temperature_scaled: 0.0,
                temp_lag_1_scaled: 0.0,
                temp_lag_2_scaled: 0.0,
                temp_lag_3_scaled: 0.0,
                temp_diff_1_scaled: 0.0,
                temp_diff_2_scaled: 0.0,
            }
        })
        .collect();
    tracing::info!(rows = table.len(), "lag and difference features");

    // 8
    let label: Vec<f64> = table.iter().map(|r| r.temperature).collect();
    let counts = unchanged_counts(&label, cfg.flat_delta);
    let before = table.len();
    table = table
        .into_iter()
        .zip(counts)
        .filter(|(_, c)| *c <= cfg.flat_cap)
        .map(|(r, _)| r)
        .collect();
    tracing::info!(
        dropped = before - table.len(),
        flat_cap = cfg.flat_cap,
        "capped flat runs"
    );

    // 9
    let scaler = if table.is_empty() {
        ScalerState::default()
    } else {
        let columns: Vec<Vec<f64>> = (0..SCALED_COLUMNS.len())
            .map(|c| table.iter().map(|r| r.unscaled()[c]).collect())
            .collect();
        let scaler = ScalerState::fit(
            SCALED_COLUMNS
                .iter()
                .copied()
                .zip(columns.iter().map(Vec::as_slice)),
        )?;
        for row in &mut table {
            let raw = row.unscaled();
            let mut scaled = [0.0; 6];
            for (c, name) in SCALED_COLUMNS.iter().enumerate() {
                scaled[c] = scaler.transform(name, raw[c])?;
            }
            row.set_scaled(scaled);
        }
        scaler
    };

    if table.len() < cfg.min_rows {
        tracing::warn!(
            rows = table.len(),
            min_rows = cfg.min_rows,
            "feature table is smaller than the data-quality floor"
        );
    }
    tracing::info!(rows = table.len(), "preprocessing complete");
    Ok((table, scaler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_gap_is_linear_by_position() {
        let mut v = vec![Some(10.0), None, None, Some(13.0)];
        assert_eq!(interpolate(&mut v), 2);
        assert_eq!(v, vec![Some(10.0), Some(11.0), Some(12.0), Some(13.0)]);
    }

    #[test]
    fn leading_gap_stays_and_trailing_gap_carries() {
        let mut v = vec![None, Some(5.0), None];
        assert_eq!(interpolate(&mut v), 1);
        assert_eq!(v, vec![None, Some(5.0), Some(5.0)]);
    }

    #[test]
    fn unchanged_counts_reset_on_change() {
        let t = [1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0];
        assert_eq!(unchanged_counts(&t, 0.01), vec![0, 1, 2, 3, 4, 0, 1]);
    }

    #[test]
    fn split_rejects_bad_fraction() {
        assert!(matches!(
            split_rows(&[], 0.0, 1),
            Err(PipelineError::Config(_))
        ));
    }
}
