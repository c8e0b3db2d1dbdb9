//! Persisted model artifact: the fitted model plus everything inference needs.

use chrono::NaiveDateTime;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thermo_core::{CALENDAR_FEATURES, ScalerState};
use thermo_model::{Evaluation, ForestParams, ModelSpec, TrainedModel, TreeParams};

pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    pub trained_at: NaiveDateTime,
    /// Column order the model was fitted on.
    pub feature_names: Vec<String>,
    pub params: ModelSpec,
    /// Training-time ranges, kept for inverting scaled values.
    pub scaler: ScalerState,
    pub evaluation: Option<Evaluation>,
    pub model: TrainedModel,
}

impl ModelArtifact {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).wrap_err("serialize model artifact")?;
        std::fs::write(path, json)
            .wrap_err_with(|| format!("write model artifact {}", path.display()))?;
        tracing::info!(path = %path.display(), kind = self.model.kind(), "model artifact saved");
        Ok(())
    }

    /// Load and check that the model is usable for calendar-only inference.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("read model artifact {}", path.display()))?;
        let artifact: Self = serde_json::from_str(&text)
            .wrap_err_with(|| format!("parse model artifact {}", path.display()))?;
        if artifact.version != ARTIFACT_VERSION {
            eyre::bail!(
                "model artifact version {} is not supported (expected {ARTIFACT_VERSION})",
                artifact.version
            );
        }
        if artifact.feature_names != CALENDAR_FEATURES {
            eyre::bail!(
                "model artifact was trained on {:?}; forecasting needs {:?}",
                artifact.feature_names,
                CALENDAR_FEATURES
            );
        }
        tracing::debug!(path = %path.display(), kind = artifact.model.kind(), "model artifact loaded");
        Ok(artifact)
    }
}

/// Hyperparameters from the `[model]` section.
pub fn model_spec(cfg: &thermo_config::ModelCfg) -> ModelSpec {
    let tree = TreeParams {
        max_depth: cfg.max_depth,
        min_samples_split: cfg.min_samples_split,
        min_samples_leaf: cfg.min_samples_leaf,
    };
    match cfg.kind {
        thermo_config::ModelKind::RandomForest => ModelSpec::RandomForest(ForestParams {
            n_estimators: cfg.n_estimators,
            tree,
            seed: cfg.seed,
            bootstrap: true,
        }),
        thermo_config::ModelKind::DecisionTree => ModelSpec::DecisionTree(tree),
    }
}
