use eyre::Result;
use std::path::{Path, PathBuf};
use thermo_core::{ForecastCfg, ForecastEngine, ForecastError, ForecastOutcome, SensorReading};

use super::{read_readings, resolve_input};
use crate::artifact::ModelArtifact;
use crate::error_fmt::ConfigError;

/// Always prints one JSON record on stdout, even on failure.
pub fn run(
    cfg: &thermo_config::Config,
    model: &Path,
    input: Option<PathBuf>,
    horizons: Option<Vec<u32>>,
) -> Result<()> {
    let horizons = horizons.unwrap_or_else(|| cfg.forecast.horizons.clone());
    thermo_config::validate_horizons(&horizons).map_err(|e| ConfigError(e.to_string()))?;
    let engine = ForecastEngine::new(ForecastCfg { horizons })?;

    let artifact = ModelArtifact::load(model)?;
    let input = resolve_input(input, cfg)?;
    let readings: Vec<SensorReading> = read_readings(&input)?;

    match engine.forecast(&artifact.model, &readings) {
        Ok(outcome) => {
            println!("{}", serde_json::to_string(&outcome)?);
            if let ForecastOutcome::Unavailable { .. } = outcome {
                return Err(ForecastError::InsufficientHistory.into());
            }
            Ok(())
        }
        Err(e) => {
            println!(
                "{}",
                serde_json::to_string(&ForecastOutcome::unavailable(e.to_string()))?
            );
            Err(e.into())
        }
    }
}
