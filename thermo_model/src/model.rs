//! Model choice and the persisted form of a fitted model.

use serde::{Deserialize, Serialize};
use thermo_traits::{BoxError, EnsembleRegressor, Regressor};

use crate::error::Result;
use crate::forest::{ForestParams, RandomForest};
use crate::tree::{RegressionTree, TreeParams};

/// Which regressor to train, with its hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    RandomForest(ForestParams),
    DecisionTree(TreeParams),
}

impl Default for ModelSpec {
    fn default() -> Self {
        ModelSpec::RandomForest(ForestParams::default())
    }
}

impl ModelSpec {
    pub fn train(&self, features: &[Vec<f64>], labels: &[f64]) -> Result<TrainedModel> {
        let model = match self {
            ModelSpec::RandomForest(p) => {
                TrainedModel::RandomForest(RandomForest::fit(features, labels, p)?)
            }
            ModelSpec::DecisionTree(p) => {
                TrainedModel::DecisionTree(RegressionTree::fit(features, labels, p)?)
            }
        };
        tracing::info!(
            kind = model.kind(),
            rows = labels.len(),
            members = model.sub_estimators().len(),
            "model trained"
        );
        Ok(model)
    }
}

/// A fitted model of either kind; serializes with a `kind` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainedModel {
    RandomForest(RandomForest),
    DecisionTree(RegressionTree),
}

impl TrainedModel {
    pub fn kind(&self) -> &'static str {
        match self {
            TrainedModel::RandomForest(_) => "random_forest",
            TrainedModel::DecisionTree(_) => "decision_tree",
        }
    }

    fn inner(&self) -> &dyn EnsembleRegressor {
        match self {
            TrainedModel::RandomForest(m) => m,
            TrainedModel::DecisionTree(m) => m,
        }
    }
}

impl Regressor for TrainedModel {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn predict(&self, features: &[f64]) -> std::result::Result<f64, BoxError> {
        self.inner().predict(features)
    }
}

impl EnsembleRegressor for TrainedModel {
    fn sub_estimators(&self) -> Vec<&dyn Regressor> {
        self.inner().sub_estimators()
    }
}
