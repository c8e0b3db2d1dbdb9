//! CART regression tree (variance reduction, axis-aligned splits).
//!
//! Nodes live in a flat arena; children are indices into it. A row goes left
//! when `x[feature] <= threshold`.

use serde::{Deserialize, Serialize};
use thermo_traits::{BoxError, EnsembleRegressor, Regressor, Trainer};

use crate::error::{ModelError, Result, check_design};

/// Minimum squared-error improvement for a split to count.
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TreeParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(ModelError::InvalidParams("max_depth must be >= 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidParams(
                "min_samples_split must be >= 2".into(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::InvalidParams(
                "min_samples_leaf must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    n_features: usize,
    nodes: Vec<Node>,
}

impl RegressionTree {
    pub fn fit(features: &[Vec<f64>], labels: &[f64], params: &TreeParams) -> Result<Self> {
        params.validate()?;
        let n_features = check_design(features, labels)?;
        let mut idx: Vec<usize> = (0..features.len()).collect();
        Ok(Self::fit_rows(features, labels, &mut idx, n_features, params))
    }

    /// Grow on the rows named by `idx` (repeats allowed, as in a bootstrap sample).
    /// The design must already be checked.
    pub(crate) fn fit_rows(
        features: &[Vec<f64>],
        labels: &[f64],
        idx: &mut [usize],
        n_features: usize,
        params: &TreeParams,
    ) -> Self {
        let mut b = Builder {
            x: features,
            y: labels,
            n_features,
            params,
            nodes: Vec::new(),
        };
        b.grow(idx, 0);
        Self {
            n_features,
            nodes: b.nodes,
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], i: usize) -> usize {
            match nodes.get(i) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    pub(crate) fn predict_row(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                got: x.len(),
            });
        }
        let mut i = 0;
        loop {
            match self.nodes.get(i) {
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => i = if x[*feature] <= *threshold { *left } else { *right },
                None => {
                    return Err(ModelError::InvalidParams(format!(
                        "tree has no node {i}"
                    )));
                }
            }
        }
    }
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    n_features: usize,
    params: &'a TreeParams,
    nodes: Vec<Node>,
}

struct Candidate {
    feature: usize,
    /// Number of sorted rows going left.
    k: usize,
    threshold: f64,
    score: f64,
}

impl Builder<'_> {
    fn grow(&mut self, idx: &mut [usize], depth: usize) -> usize {
        let at = self.nodes.len();
        let n = idx.len();
        let sum: f64 = idx.iter().map(|&i| self.y[i]).sum();
        let mean = sum / n as f64;
        self.nodes.push(Node::Leaf { value: mean });

        if depth >= self.params.max_depth
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
        {
            return at;
        }
        let Some(best) = self.best_split(idx, sum) else {
            return at;
        };

        self.sort_by_feature(idx, best.feature);
        let (l, r) = idx.split_at_mut(best.k);
        let left = self.grow(l, depth + 1);
        let right = self.grow(r, depth + 1);
        self.nodes[at] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        at
    }

    fn sort_by_feature(&self, idx: &mut [usize], f: usize) {
        idx.sort_by(|&a, &b| self.x[a][f].total_cmp(&self.x[b][f]));
    }

    /// Maximizes `sum_l^2 / n_l + sum_r^2 / n_r`, which minimizes the
    /// children's summed squared error.
    fn best_split(&self, idx: &mut [usize], sum: f64) -> Option<Candidate> {
        let n = idx.len();
        let min_leaf = self.params.min_samples_leaf;
        let parent = sum * sum / n as f64;
        let mut best: Option<Candidate> = None;

        for f in 0..self.n_features {
            self.sort_by_feature(idx, f);
            let mut left_sum = 0.0;
            for k in 1..n {
                left_sum += self.y[idx[k - 1]];
                let lo = self.x[idx[k - 1]][f];
                let hi = self.x[idx[k]][f];
                if lo >= hi || k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let right_sum = sum - left_sum;
                let score =
                    left_sum * left_sum / k as f64 + right_sum * right_sum / (n - k) as f64;
                if score - parent <= MIN_GAIN {
                    continue;
                }
                if best.as_ref().is_none_or(|b| score > b.score) {
                    let mid = lo + (hi - lo) / 2.0;
                    best = Some(Candidate {
                        feature: f,
                        k,
                        threshold: if mid < hi { mid } else { lo },
                        score,
                    });
                }
            }
        }
        best
    }
}

impl Regressor for RegressionTree {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> std::result::Result<f64, BoxError> {
        Ok(self.predict_row(features)?)
    }
}

/// A lone tree is its own single-member ensemble.
impl EnsembleRegressor for RegressionTree {
    fn sub_estimators(&self) -> Vec<&dyn Regressor> {
        vec![self]
    }
}

impl Trainer for TreeParams {
    type Model = RegressionTree;

    fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[f64],
    ) -> std::result::Result<RegressionTree, BoxError> {
        let tree = RegressionTree::fit(features, labels, self)?;
        tracing::info!(
            rows = labels.len(),
            depth = tree.depth(),
            leaves = tree.n_leaves(),
            "decision tree fitted"
        );
        Ok(tree)
    }
}
