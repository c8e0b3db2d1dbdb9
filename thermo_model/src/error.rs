use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,
    #[error("shape mismatch: expected {expected} values, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("prediction failed: {0}")]
    Prediction(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Every row must have `n_features` columns and there must be one label per row.
pub(crate) fn check_design(features: &[Vec<f64>], labels: &[f64]) -> Result<usize> {
    let Some(first) = features.first() else {
        return Err(ModelError::EmptyTrainingSet);
    };
    if labels.len() != features.len() {
        return Err(ModelError::ShapeMismatch {
            expected: features.len(),
            got: labels.len(),
        });
    }
    let n_features = first.len();
    if n_features == 0 {
        return Err(ModelError::InvalidParams("feature rows are empty".into()));
    }
    if let Some(row) = features.iter().find(|r| r.len() != n_features) {
        return Err(ModelError::ShapeMismatch {
            expected: n_features,
            got: row.len(),
        });
    }
    Ok(n_features)
}
