use eyre::Result;
use std::path::{Path, PathBuf};
use thermo_core::RunLengthDeduplicator;

use super::{dedup_cfg, read_readings, report, resolve_input};

pub fn run(
    cfg: &thermo_config::Config,
    json: bool,
    input: Option<PathBuf>,
    output: &Path,
) -> Result<()> {
    let input = resolve_input(input, cfg)?;
    let readings = read_readings(&input)?;
    let dedup = RunLengthDeduplicator::new(dedup_cfg(cfg));
    let kept = dedup.collapse(&readings);

    let records: Vec<thermo_config::ReadingRecord> =
        kept.iter().map(thermo_config::ReadingRecord::from).collect();
    thermo_config::write_readings_csv(output, &records)?;

    report(
        json,
        serde_json::json!({
            "command": "dedup",
            "input": input.display().to_string(),
            "output": output.display().to_string(),
            "readings": readings.len(),
            "kept": kept.len(),
            "min_run": dedup.cfg().min_run,
        }),
        || format!("kept {} of {} readings -> {}", kept.len(), readings.len(), output.display()),
    );
    Ok(())
}
