#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas, reading ingestion and feature-table persistence.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Reading CSVs are resolved through column synonyms (`readings` module).
//! - The processed feature table has a fixed CSV schema (`table` module).
use serde::Deserialize;

pub mod readings;
pub mod table;

pub use readings::{
    ReadingRecord, ReadingsCsv, UnresolvedColumn, load_readings_csv, parse_timestamp, read_readings,
    write_readings_csv,
};
pub use table::{FeatureRecord, load_feature_csv, write_feature_csv};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DataCfg {
    /// Default readings CSV when a command is not given `--input`.
    pub path: Option<String>,
    /// Keep only the last N hours before the newest reading (0 disables).
    pub filter_hours: u32,
}

impl Default for DataCfg {
    fn default() -> Self {
        Self {
            path: None,
            filter_hours: 24,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DedupCfg {
    /// Runs at least this long collapse to their first reading.
    pub min_run: usize,
    /// Absolute tolerance for "same value". Also accepts alias "tolerance".
    #[serde(alias = "tolerance")]
    pub tol: f64,
}

impl Default for DedupCfg {
    fn default() -> Self {
        Self {
            min_run: 3,
            tol: 1e-9,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PreprocessCfg {
    /// Physical sensor range; readings outside are invalid, not outliers.
    pub min_temp: f64,
    pub max_temp: f64,
    /// Consecutive rows closer than this count as "unchanged".
    pub flat_delta: f64,
    /// Rows whose run-local unchanged count exceeds this are dropped.
    pub flat_cap: usize,
    /// Data-quality floor; fewer rows only warns.
    pub min_rows: usize,
}

impl Default for PreprocessCfg {
    fn default() -> Self {
        Self {
            min_temp: -20.0,
            max_temp: 60.0,
            flat_delta: 0.01,
            flat_cap: 3,
            min_rows: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SplitCfg {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitCfg {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    RandomForest,
    DecisionTree,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModelCfg {
    pub kind: ModelKind,
    /// Ignored for `decision_tree`.
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ModelCfg {
    fn default() -> Self {
        Self {
            kind: ModelKind::RandomForest,
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ForecastCfg {
    /// Offsets in minutes after the latest reading.
    pub horizons: Vec<u32>,
}

impl Default for ForecastCfg {
    fn default() -> Self {
        Self {
            horizons: vec![15, 30, 45, 60],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub data: DataCfg,
    pub dedup: DedupCfg,
    pub preprocess: PreprocessCfg,
    pub split: SplitCfg,
    pub model: ModelCfg,
    pub forecast: ForecastCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Dedup
        if self.dedup.min_run == 0 {
            eyre::bail!("dedup.min_run must be >= 1");
        }
        if !(self.dedup.tol.is_finite() && self.dedup.tol >= 0.0) {
            eyre::bail!("dedup.tol must be a finite value >= 0");
        }

        // Preprocess
        let p = &self.preprocess;
        if !(p.min_temp.is_finite() && p.max_temp.is_finite()) {
            eyre::bail!("preprocess.min_temp and preprocess.max_temp must be finite");
        }
        if p.min_temp >= p.max_temp {
            eyre::bail!("preprocess.min_temp must be < preprocess.max_temp");
        }
        if !(p.flat_delta.is_finite() && p.flat_delta > 0.0) {
            eyre::bail!("preprocess.flat_delta must be > 0");
        }
        if p.flat_cap == 0 {
            eyre::bail!("preprocess.flat_cap must be >= 1");
        }

        // Split
        if !(self.split.test_fraction > 0.0 && self.split.test_fraction < 1.0) {
            eyre::bail!("split.test_fraction must be in (0.0, 1.0)");
        }

        // Model
        if self.model.kind == ModelKind::RandomForest && self.model.n_estimators == 0 {
            eyre::bail!("model.n_estimators must be >= 1");
        }
        if self.model.max_depth == 0 {
            eyre::bail!("model.max_depth must be >= 1");
        }
        if self.model.min_samples_split < 2 {
            eyre::bail!("model.min_samples_split must be >= 2");
        }
        if self.model.min_samples_leaf == 0 {
            eyre::bail!("model.min_samples_leaf must be >= 1");
        }

        // Forecast
        validate_horizons(&self.forecast.horizons)?;

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}

/// Horizons must be non-empty, positive and strictly increasing.
pub fn validate_horizons(horizons: &[u32]) -> eyre::Result<()> {
    if horizons.is_empty() {
        eyre::bail!("forecast.horizons must not be empty");
    }
    if horizons.contains(&0) {
        eyre::bail!("forecast.horizons must be > 0 minutes");
    }
    if horizons.windows(2).any(|w| w[1] <= w[0]) {
        eyre::bail!("forecast.horizons must be strictly increasing");
    }
    Ok(())
}
