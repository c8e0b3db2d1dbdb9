//! Subcommand implementations and the helpers they share.

pub mod dedup;
pub mod forecast;
pub mod generate;
pub mod preprocess;
pub mod train;

use crate::error_fmt::ConfigError;
use eyre::Result;
use std::path::{Path, PathBuf};
use thermo_core::{
    DataSource, DedupCfg, FeatureBuilder, FeatureRow, PipelineError, PreprocessCfg,
    RunLengthDeduplicator, ScalerState, SensorReading,
};

/// `--input`, else `data.path` from the config.
pub fn resolve_input(input: Option<PathBuf>, cfg: &thermo_config::Config) -> Result<PathBuf> {
    input
        .or_else(|| cfg.data.path.as_ref().map(PathBuf::from))
        .ok_or_else(|| ConfigError("no input: pass --input or set data.path".into()).into())
}

/// Every row needs a timestamp; missing temperatures come through as NaN.
pub fn read_readings(path: &Path) -> Result<Vec<SensorReading>> {
    if !path.exists() {
        return Err(PipelineError::Io(format!("{} not found", path.display())).into());
    }
    let csv = thermo_config::load_readings_csv(path)?;
    if csv.time_column.is_none() && !csv.rows.is_empty() {
        return Err(PipelineError::MissingColumn("recorded_time").into());
    }
    let readings = csv
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            SensorReading::try_from(r).map_err(|_| {
                // header is line 1
                PipelineError::InvalidData(format!("row {} has no timestamp", i + 2))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(
        path = %path.display(),
        readings = readings.len(),
        value_column = %csv.value_column,
        "readings loaded"
    );
    Ok(readings)
}

pub fn dedup_cfg(cfg: &thermo_config::Config) -> DedupCfg {
    DedupCfg::from(&cfg.dedup)
}

/// Dedup, then run the feature builder over the surviving readings.
pub fn build_features(
    readings: &[SensorReading],
    cfg: &thermo_config::Config,
) -> Result<(Vec<FeatureRow>, ScalerState)> {
    let deduped = RunLengthDeduplicator::new(dedup_cfg(cfg)).collapse(readings);
    let sensors = {
        let mut ids: Vec<&str> = deduped.iter().map(|r| r.sensor_id.as_str()).collect();
        ids.dedup();
        ids.len()
    };
    if sensors > 1 {
        tracing::warn!(sensors, "several sensors in one input; their readings are merged by time");
    }
    let mut builder = FeatureBuilder::new(
        Some(DataSource::from(deduped.as_slice())),
        PreprocessCfg::from_config(cfg),
    );
    builder.load()?;
    builder.preprocess()?;
    Ok(builder.into_parts()?)
}

/// One summary line on stdout: JSON in `--json` mode, text otherwise.
pub fn report(json: bool, value: serde_json::Value, text: impl FnOnce() -> String) {
    if json {
        println!("{value}");
    } else {
        println!("{}", text());
    }
}
