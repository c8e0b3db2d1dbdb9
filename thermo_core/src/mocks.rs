//! Test and helper regressors for thermo_core

use thermo_traits::{BoxError, EnsembleRegressor, Regressor};

/// Predicts the same value for every input.
#[derive(Debug, Clone, Copy)]
pub struct ConstantModel {
    pub value: f64,
    pub n_features: usize,
}

impl ConstantModel {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            n_features: crate::calendar::CALENDAR_FEATURES.len(),
        }
    }
}

impl Regressor for ConstantModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &[f64]) -> Result<f64, BoxError> {
        check_width(self.n_features, x)?;
        Ok(self.value)
    }
}

impl EnsembleRegressor for ConstantModel {
    fn sub_estimators(&self) -> Vec<&dyn Regressor> {
        vec![self]
    }
}

/// Ensemble of constant members; the aggregate prediction is their mean.
#[derive(Debug, Clone)]
pub struct FixedEnsemble {
    members: Vec<ConstantModel>,
}

impl FixedEnsemble {
    pub fn new(values: &[f64]) -> Self {
        Self {
            members: values.iter().map(|&v| ConstantModel::new(v)).collect(),
        }
    }
}

impl Regressor for FixedEnsemble {
    fn n_features(&self) -> usize {
        crate::calendar::CALENDAR_FEATURES.len()
    }

    fn predict(&self, x: &[f64]) -> Result<f64, BoxError> {
        check_width(self.n_features(), x)?;
        if self.members.is_empty() {
            return Err("empty ensemble".into());
        }
        Ok(self.members.iter().map(|m| m.value).sum::<f64>() / self.members.len() as f64)
    }
}

impl EnsembleRegressor for FixedEnsemble {
    fn sub_estimators(&self) -> Vec<&dyn Regressor> {
        self.members.iter().map(|m| m as &dyn Regressor).collect()
    }
}

/// Predicts the input hour plus an offset; lets tests see which timestamp was encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct HourEcho {
    pub offset: f64,
}

impl Regressor for HourEcho {
    fn n_features(&self) -> usize {
        crate::calendar::CALENDAR_FEATURES.len()
    }

    fn predict(&self, x: &[f64]) -> Result<f64, BoxError> {
        check_width(self.n_features(), x)?;
        Ok(x[0] + self.offset)
    }
}

impl EnsembleRegressor for HourEcho {
    fn sub_estimators(&self) -> Vec<&dyn Regressor> {
        vec![self]
    }
}

/// Always fails to predict.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingModel;

impl Regressor for FailingModel {
    fn n_features(&self) -> usize {
        crate::calendar::CALENDAR_FEATURES.len()
    }

    fn predict(&self, _x: &[f64]) -> Result<f64, BoxError> {
        Err(Box::new(std::io::Error::other("model backend unavailable")))
    }
}

impl EnsembleRegressor for FailingModel {
    fn sub_estimators(&self) -> Vec<&dyn Regressor> {
        Vec::new()
    }
}

fn check_width(expected: usize, x: &[f64]) -> Result<(), BoxError> {
    if x.len() == expected {
        Ok(())
    } else {
        Err(format!("expected {expected} features, got {}", x.len()).into())
    }
}
