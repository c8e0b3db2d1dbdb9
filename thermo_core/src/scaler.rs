//! Min-max scaling state.
//!
//! A `ScalerState` is fitted once on a training table and then only read.
//! Inference reuses the training-time ranges; fitting on a single new point
//! would collapse every range to zero.

use crate::error::ScalerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fitted range of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// `None` for an empty column.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let (first, rest) = values.split_first()?;
        let init = MinMax {
            min: *first,
            max: *first,
        };
        Some(rest.iter().fold(init, |acc, &v| MinMax {
            min: acc.min.min(v),
            max: acc.max.max(v),
        }))
    }

    /// Width used as divisor; a zero-width range divides by 1.
    #[inline]
    fn span(&self) -> f64 {
        let r = self.max - self.min;
        if r == 0.0 || !r.is_finite() { 1.0 } else { r }
    }

    /// Not clamped: values outside the fitted range map outside [0, 1].
    #[inline]
    pub fn transform(&self, x: f64) -> f64 {
        (x - self.min) / self.span()
    }

    #[inline]
    pub fn inverse_transform(&self, y: f64) -> f64 {
        y * self.span() + self.min
    }
}

/// Per-column min-max state, `{feature_name: (min, max)}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScalerState {
    columns: BTreeMap<String, MinMax>,
}

impl ScalerState {
    /// Fit each named column independently.
    pub fn fit<'a, I>(columns: I) -> Result<Self, ScalerError>
    where
        I: IntoIterator<Item = (&'a str, &'a [f64])>,
    {
        let mut out = BTreeMap::new();
        for (name, values) in columns {
            let mm = MinMax::fit(values).ok_or_else(|| ScalerError::EmptyColumn(name.into()))?;
            out.insert(name.to_string(), mm);
        }
        Ok(Self { columns: out })
    }

    pub fn range(&self, name: &str) -> Option<MinMax> {
        self.columns.get(name).copied()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn lookup(&self, name: &str) -> Result<&MinMax, ScalerError> {
        self.columns
            .get(name)
            .ok_or_else(|| ScalerError::UnknownColumn(name.into()))
    }

    pub fn transform(&self, name: &str, x: f64) -> Result<f64, ScalerError> {
        Ok(self.lookup(name)?.transform(x))
    }

    pub fn transform_column(&self, name: &str, values: &[f64]) -> Result<Vec<f64>, ScalerError> {
        let mm = self.lookup(name)?;
        Ok(values.iter().map(|&v| mm.transform(v)).collect())
    }

    pub fn inverse_transform(&self, name: &str, y: f64) -> Result<f64, ScalerError> {
        Ok(self.lookup(name)?.inverse_transform(y))
    }
}
