//! Runtime configuration for the pipeline stages.
//!
//! These are the structs the core actually consumes. They are separate from
//! the TOML-deserialized config in `thermo_config`; see `conversions`.

/// Run-length deduplication knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupCfg {
    /// Runs of at least this many readings collapse to their first member.
    pub min_run: usize,
    /// Absolute tolerance for "same value".
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

/// Feature-construction knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessCfg {
    /// Inclusive physical range of the sensor in °C.
    pub min_temp: f64,
    pub max_temp: f64,
    /// Rows closer than this to their predecessor count as unchanged.
    pub flat_delta: f64,
    /// Rows whose run-local unchanged count exceeds this are dropped.
    pub flat_cap: usize,
    /// Below this many rows a data-quality warning is logged.
    pub min_rows: usize,
    /// Keep only the last N hours before the newest row at load (None keeps all).
    pub filter_hours: Option<u32>,
}

impl Default for PreprocessCfg {
    fn default() -> Self {
        Self {
            min_temp: -20.0,
            max_temp: 60.0,
            flat_delta: 0.01,
            flat_cap: 3,
            min_rows: 10,
            filter_hours: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
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

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastCfg {
    /// Minutes after the latest reading, strictly increasing.
    pub horizons: Vec<u32>,
}

impl Default for ForecastCfg {
    fn default() -> Self {
        Self {
            horizons: vec![15, 30, 45, 60],
        }
    }
}
