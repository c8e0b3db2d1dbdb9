#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Tree regressors behind the `thermo_traits` model seam.
//!
//! `RegressionTree` is a CART tree grown by variance reduction; `RandomForest`
//! bags trees over seeded bootstrap samples and exposes them as ensemble
//! members. Both serialize with serde so a fitted model can be persisted.

pub mod error;
pub mod forest;
pub mod metrics;
pub mod model;
pub mod tree;

pub use error::{ModelError, Result};
pub use forest::{ForestParams, RandomForest};
pub use metrics::{Evaluation, evaluate};
pub use model::{ModelSpec, TrainedModel};
pub use tree::{RegressionTree, TreeParams};
