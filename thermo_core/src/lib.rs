#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Temperature pipeline core (model-agnostic).
//!
//! Regressors are reached only through `thermo_traits::{Regressor, EnsembleRegressor}`,
//! so any ensemble with per-member predictions plugs into the forecast engine.
//!
//! ## Stages
//!
//! - **Dedup**: collapse flat-lined runs per sensor (`dedup` module)
//! - **Features**: the `FeatureBuilder` state machine, from raw rows to a scaled
//!   supervised table (`features` module)
//! - **Scaling**: per-column min-max ranges kept for later inversion (`scaler` module)
//! - **Forecast**: calendar-only inference over fixed horizons with ensemble-spread
//!   confidence (`forecast` module)
//!
//! The time-of-day bucket rule lives once, in `calendar`, and both the training table
//! and the forecast engine call it.

pub mod calendar;
pub mod config;
pub mod conversions;
pub mod dedup;
pub mod error;
pub mod features;
pub mod forecast;
pub mod mocks;
pub mod reading;
pub mod scaler;

pub use calendar::{CALENDAR_FEATURES, CalendarFeatures, TimeOfDay};
pub use config::{DedupCfg, ForecastCfg, PreprocessCfg, SplitCfg};
pub use dedup::{RunLengthDeduplicator, collapse};
pub use error::{ForecastError, PipelineError, Result, ScalerError};
pub use features::{
    DataSource, FeatureBuilder, FeatureRow, RawRow, SCALED_COLUMNS, calendar_design,
    calendar_feature_names, split_rows,
};
pub use forecast::{ForecastEngine, ForecastOutcome, ForecastPoint, ForecastResult, confidence};
pub use reading::{SensorReading, latest};
pub use scaler::{MinMax, ScalerState};
