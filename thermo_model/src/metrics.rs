//! Hold-out evaluation.

use serde::{Deserialize, Serialize};
use thermo_traits::Regressor;

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    /// 1.0 for a perfect fit; 0.0 when labels are constant and the fit is not exact.
    pub r2: f64,
}

pub fn from_predictions(truth: &[f64], predicted: &[f64]) -> Result<Evaluation> {
    if truth.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    if truth.len() != predicted.len() {
        return Err(ModelError::ShapeMismatch {
            expected: truth.len(),
            got: predicted.len(),
        });
    }
    let n = truth.len() as f64;
    let (sq, abs) = truth
        .iter()
        .zip(predicted)
        .fold((0.0, 0.0), |(sq, abs), (t, p)| {
            (sq + (t - p).powi(2), abs + (t - p).abs())
        });
    let mean = truth.iter().sum::<f64>() / n;
    let ss_tot: f64 = truth.iter().map(|t| (t - mean).powi(2)).sum();
    let r2 = if ss_tot > 0.0 {
        1.0 - sq / ss_tot
    } else if sq == 0.0 {
        1.0
    } else {
        0.0
    };
    let mse = sq / n;
    Ok(Evaluation {
        mse,
        rmse: mse.sqrt(),
        mae: abs / n,
        r2,
    })
}

/// Score `model` on a labelled set.
pub fn evaluate(model: &dyn Regressor, features: &[Vec<f64>], labels: &[f64]) -> Result<Evaluation> {
    let predicted = model
        .predict_batch(features)
        .map_err(|e| ModelError::Prediction(e.to_string()))?;
    let eval = from_predictions(labels, &predicted)?;
    tracing::info!(
        rows = labels.len(),
        mse = eval.mse,
        rmse = eval.rmse,
        mae = eval.mae,
        r2 = eval.r2,
        "evaluation"
    );
    Ok(eval)
}
