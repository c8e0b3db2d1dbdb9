//! Bagged regression trees.
//!
//! Each tree is grown on a bootstrap sample drawn from one seeded RNG, so the
//! same params and data always give the same forest. The aggregate prediction
//! is the mean over trees; the trees themselves are the ensemble members.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thermo_traits::{BoxError, EnsembleRegressor, Regressor, Trainer};

use crate::error::{ModelError, Result, check_design};
use crate::tree::{RegressionTree, TreeParams};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub tree: TreeParams,
    pub seed: u64,
    /// Sample rows with replacement per tree; `false` grows every tree on all rows.
    pub bootstrap: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            tree: TreeParams::default(),
            seed: 42,
            bootstrap: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn fit(features: &[Vec<f64>], labels: &[f64], params: &ForestParams) -> Result<Self> {
        if params.n_estimators == 0 {
            return Err(ModelError::InvalidParams(
                "n_estimators must be >= 1".into(),
            ));
        }
        params.tree.validate()?;
        let n_features = check_design(features, labels)?;
        let n = labels.len();
        let mut rng = StdRng::seed_from_u64(params.seed);

        let trees = (0..params.n_estimators)
            .map(|_| {
                let mut idx: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit_rows(features, labels, &mut idx, n_features, &params.tree)
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            trees = trees.len(),
            max_depth = trees.iter().map(RegressionTree::depth).max().unwrap_or(0),
            "forest grown"
        );
        Ok(Self { n_features, trees })
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    fn mean_prediction(&self, x: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidParams("forest has no trees".into()));
        }
        let mut sum = 0.0;
        for t in &self.trees {
            sum += t.predict_row(x)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}

impl Regressor for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> std::result::Result<f64, BoxError> {
        Ok(self.mean_prediction(features)?)
    }
}

impl EnsembleRegressor for RandomForest {
    fn sub_estimators(&self) -> Vec<&dyn Regressor> {
        self.trees.iter().map(|t| t as &dyn Regressor).collect()
    }
}

impl Trainer for ForestParams {
    type Model = RandomForest;

    fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[f64],
    ) -> std::result::Result<RandomForest, BoxError> {
        let forest = RandomForest::fit(features, labels, self)?;
        tracing::info!(
            rows = labels.len(),
            n_estimators = self.n_estimators,
            seed = self.seed,
            "random forest fitted"
        );
        Ok(forest)
    }
}
