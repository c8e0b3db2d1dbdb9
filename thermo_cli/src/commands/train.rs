use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use thermo_core::{SplitCfg, calendar_design, calendar_feature_names, split_rows};
use thermo_model::evaluate;

use super::preprocess::write_table;
use super::{build_features, read_readings, report, resolve_input};
use crate::artifact::{ARTIFACT_VERSION, ModelArtifact, model_spec};

pub const TABLE_FILE: &str = "processed_sensor_data.csv";
pub const MODEL_FILE: &str = "model.json";

pub fn run(
    cfg: &thermo_config::Config,
    json: bool,
    input: Option<PathBuf>,
    output_dir: &Path,
) -> Result<()> {
    let input = resolve_input(input, cfg)?;
    let readings = read_readings(&input)?;
    let (table, scaler) = build_features(&readings, cfg)?;

    std::fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("create output directory {}", output_dir.display()))?;
    let table_path = output_dir.join(TABLE_FILE);
    write_table(&table_path, &table)?;

    let split = SplitCfg::from(&cfg.split);
    let (train, test) = split_rows(&table, split.test_fraction, split.seed)?;
    let (x_train, y_train) = calendar_design(&train);
    let spec = model_spec(&cfg.model);
    let model = spec.train(&x_train, &y_train)?;

    let evaluation = if test.is_empty() {
        tracing::warn!("test split is empty; skipping evaluation");
        None
    } else {
        let (x_test, y_test) = calendar_design(&test);
        Some(evaluate(&model, &x_test, &y_test)?)
    };

    let model_path = output_dir.join(MODEL_FILE);
    let kind = model.kind();
    ModelArtifact {
        version: ARTIFACT_VERSION,
        trained_at: chrono::Local::now().naive_local(),
        feature_names: calendar_feature_names(),
        params: spec,
        scaler,
        evaluation,
        model,
    }
    .save(&model_path)?;

    report(
        json,
        serde_json::json!({
            "command": "train",
            "model": model_path.display().to_string(),
            "table": table_path.display().to_string(),
            "kind": kind,
            "rows": table.len(),
            "train_rows": train.len(),
            "test_rows": test.len(),
            "evaluation": evaluation,
        }),
        || {
            let mut out = format!(
                "trained {kind} on {} rows ({} held out)\nmodel: {}\nfeatures: {}",
                train.len(),
                test.len(),
                model_path.display(),
                table_path.display()
            );
            if let Some(e) = evaluation {
                out.push_str(&format!(
                    "\nMSE: {:.4}\nRMSE: {:.4}\nMAE: {:.4}\nR2: {:.4}",
                    e.mse, e.rmse, e.mae, e.r2
                ));
            }
            out
        },
    );
    Ok(())
}
