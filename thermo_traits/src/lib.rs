//! Collaborator interfaces the forecasting core talks through.
//!
//! The core never knows which regressor family it is driving. Anything that
//! can predict a single feature row (and, for confidence scoring, expose its
//! ensemble members) plugs in here.

pub mod model;

pub use model::{BoxError, EnsembleRegressor, Regressor, Trainer};
