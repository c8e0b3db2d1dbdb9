/// Error type crossing the collaborator boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A fitted point-prediction model over fixed-width numeric feature rows.
pub trait Regressor {
    /// Number of features each row must carry.
    fn n_features(&self) -> usize;

    fn predict(&self, features: &[f64]) -> Result<f64, BoxError>;

    /// Predict every row; stops at the first failing row.
    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, BoxError> {
        rows.iter().map(|r| self.predict(r)).collect()
    }
}

/// A model that produces an aggregate prediction and a non-empty sequence of
/// member models evaluated on the same input.
///
/// Used solely for agreement-based confidence scoring; bagged trees, boosted
/// stages and single-member wrappers all qualify.
pub trait EnsembleRegressor: Regressor {
    fn sub_estimators(&self) -> Vec<&dyn Regressor>;

    /// Each member's prediction for `features`, in member order.
    fn member_predictions(&self, features: &[f64]) -> Result<Vec<f64>, BoxError> {
        self.sub_estimators()
            .iter()
            .map(|m| m.predict(features))
            .collect()
    }
}

/// Blocking `fit(X, y) -> model`. Implementations may parallelize internally.
pub trait Trainer {
    type Model: EnsembleRegressor;

    fn fit(&self, features: &[Vec<f64>], labels: &[f64]) -> Result<Self::Model, BoxError>;
}
