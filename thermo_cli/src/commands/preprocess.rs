use eyre::Result;
use std::path::{Path, PathBuf};

use super::{build_features, read_readings, report, resolve_input};

pub fn run(
    cfg: &thermo_config::Config,
    json: bool,
    input: Option<PathBuf>,
    output: &Path,
) -> Result<()> {
    let input = resolve_input(input, cfg)?;
    let readings = read_readings(&input)?;
    let (table, _scaler) = build_features(&readings, cfg)?;
    write_table(output, &table)?;

    report(
        json,
        serde_json::json!({
            "command": "preprocess",
            "input": input.display().to_string(),
            "output": output.display().to_string(),
            "readings": readings.len(),
            "rows": table.len(),
        }),
        || format!("wrote {} feature rows -> {}", table.len(), output.display()),
    );
    Ok(())
}

pub fn write_table(path: &Path, table: &[thermo_core::FeatureRow]) -> Result<()> {
    let records: Vec<thermo_config::FeatureRecord> =
        table.iter().map(thermo_config::FeatureRecord::from).collect();
    thermo_config::write_feature_csv(path, &records)?;
    tracing::info!(path = %path.display(), rows = records.len(), "feature table written");
    Ok(())
}
