//! Multi-horizon inference with ensemble-spread confidence.
//!
//! Only the newest reading anchors a forecast. Each horizon's feature vector
//! is the calendar encoding of `anchor + minutes`, built by
//! `CalendarFeatures::at`, the same function the training table uses.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use thermo_traits::EnsembleRegressor;

use crate::calendar::{CALENDAR_FEATURES, CalendarFeatures};
use crate::config::ForecastCfg;
use crate::error::ForecastError;
use crate::reading::{SensorReading, latest};

/// Guards the spread normalization when all member predictions agree.
pub const EPS: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub minutes_ahead: u32,
    #[serde(rename = "temperature")]
    pub predicted_temperature: f64,
    pub confidence: f64,
    pub predicted_time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub current_time: NaiveDateTime,
    pub current_temperature: f64,
    /// Ascending `minutes_ahead`.
    #[serde(rename = "hour_predictions")]
    pub points: Vec<ForecastPoint>,
    pub max_temperature: f64,
    /// Confidence of the point that reached `max_temperature`.
    pub max_confidence: f64,
}

/// What the engine hands back for a history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForecastOutcome {
    Ok(ForecastResult),
    /// No history to anchor on; serialized as the zero-valued failure record.
    Unavailable {
        error: String,
        temperature: f64,
        confidence: f64,
    },
}

impl ForecastOutcome {
    pub fn unavailable(error: impl Into<String>) -> Self {
        ForecastOutcome::Unavailable {
            error: error.into(),
            temperature: 0.0,
            confidence: 0.0,
        }
    }

    pub fn result(&self) -> Option<&ForecastResult> {
        match self {
            ForecastOutcome::Ok(r) => Some(r),
            ForecastOutcome::Unavailable { .. } => None,
        }
    }
}

/// `1 - std / (max - min + EPS)` over member predictions, clamped to `[0, 1]`.
/// Population standard deviation; an empty or single-member set is fully confident.
pub fn confidence(member_predictions: &[f64]) -> f64 {
    let n = member_predictions.len();
    if n < 2 {
        return 1.0;
    }
    let mean = member_predictions.iter().sum::<f64>() / n as f64;
    let var = member_predictions
        .iter()
        .map(|p| (p - mean).powi(2))
        .sum::<f64>()
        / n as f64;
    let (lo, hi) = member_predictions
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
            (lo.min(p), hi.max(p))
        });
    let c = 1.0 - var.sqrt() / (hi - lo + EPS);
    if c.is_finite() { c.clamp(0.0, 1.0) } else { 0.0 }
}

#[derive(Debug, Clone)]
pub struct ForecastEngine {
    cfg: ForecastCfg,
}

impl ForecastEngine {
    /// Horizons must be non-empty, positive and strictly increasing.
    pub fn new(cfg: ForecastCfg) -> Result<Self, ForecastError> {
        if cfg.horizons.is_empty() {
            return Err(ForecastError::InvalidHorizons("no horizons given".into()));
        }
        if cfg.horizons.contains(&0) {
            return Err(ForecastError::InvalidHorizons(
                "horizons must be positive minutes".into(),
            ));
        }
        if cfg.horizons.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::InvalidHorizons(format!(
                "horizons must be strictly increasing, got {:?}",
                cfg.horizons
            )));
        }
        Ok(Self { cfg })
    }

    pub fn horizons(&self) -> &[u32] {
        &self.cfg.horizons
    }

    /// Forecast from the newest reading in `history` that has a value. A history
    /// with no such reading yields `ForecastOutcome::Unavailable` rather than an error.
    pub fn forecast(
        &self,
        model: &dyn EnsembleRegressor,
        history: &[SensorReading],
    ) -> Result<ForecastOutcome, ForecastError> {
        let Some(anchor) = latest(history) else {
            tracing::warn!(readings = history.len(), "no valid reading to anchor forecast");
            return Ok(ForecastOutcome::unavailable(
                ForecastError::InsufficientHistory.to_string(),
            ));
        };
        self.forecast_from(model, anchor).map(ForecastOutcome::Ok)
    }

    pub fn forecast_from(
        &self,
        model: &dyn EnsembleRegressor,
        anchor: &SensorReading,
    ) -> Result<ForecastResult, ForecastError> {
        if model.n_features() != CALENDAR_FEATURES.len() {
            return Err(ForecastError::Model(format!(
                "model expects {} features, calendar encoding has {}",
                model.n_features(),
                CALENDAR_FEATURES.len()
            )));
        }

        let mut points = Vec::with_capacity(self.cfg.horizons.len());
        for &minutes in &self.cfg.horizons {
            let predicted_time = anchor.timestamp + Duration::minutes(i64::from(minutes));
            let x = CalendarFeatures::at(predicted_time).to_vector();
            let predicted_temperature = model
                .predict(&x)
                .map_err(|e| ForecastError::Model(e.to_string()))?;
            let spread = model
                .member_predictions(&x)
                .map_err(|e| ForecastError::Model(e.to_string()))?;
            let confidence = confidence(&spread);
            tracing::debug!(
                minutes,
                predicted_temperature,
                confidence,
                members = spread.len(),
                "horizon forecast"
            );
            points.push(ForecastPoint {
                minutes_ahead: minutes,
                predicted_temperature,
                confidence,
                predicted_time,
            });
        }

        // first occurrence wins on ties
        let best = points
            .iter()
            .reduce(|best, p| {
                if p.predicted_temperature > best.predicted_temperature {
                    p
                } else {
                    best
                }
            })
            .ok_or_else(|| ForecastError::InvalidHorizons("no horizons given".into()))?;
        let (max_temperature, max_confidence) = (best.predicted_temperature, best.confidence);

        tracing::info!(
            anchor = %anchor.timestamp,
            horizons = points.len(),
            max_temperature,
            max_confidence,
            "forecast complete"
        );
        Ok(ForecastResult {
            current_time: anchor.timestamp,
            current_temperature: anchor.value,
            points,
            max_temperature,
            max_confidence,
        })
    }
}
