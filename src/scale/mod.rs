//! Min-max feature scaling.
//!
//! The model is trained on features normalized column-wise into `[0, 1]`.
//! The scaler is fitted once upstream (alongside training) and persisted as
//! JSON; at inference time it must be applied with the exact column order of
//! [`crate::domain::FEATURE_NAMES`].
//!
//! Columns scale independently of each other. The forecaster relies on this:
//! when it inverts predictions it pads the exogenous slots with zeros, and
//! only the close column of the inverse transform is read back.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{N_FEATURES, Observation};

#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("scaler expects {expected} feature columns, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("scaler fit requires at least one observation")]
    EmptyFit,
    #[error("non-finite value in feature column {column} during fit")]
    NonFiniteFit { column: usize },
    #[error("invalid fitted range in feature column {column}")]
    InvalidRange { column: usize },
    #[error("failed to read scaler file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse scaler file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Per-column min-max scaler over the canonical feature columns.
///
/// Forward transform: `(x - min) / (max - min)`, mapping the fitted range to
/// `[0, 1]`. A degenerate column (`max == min`) maps to `0` and inverts back
/// to its constant value exactly, matching the upstream scaler's zero-range
/// handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: Vec<f64>,
    data_max: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit column minima/maxima over historical observations.
    pub fn fit(observations: &[Observation]) -> Result<Self, ScaleError> {
        if observations.is_empty() {
            return Err(ScaleError::EmptyFit);
        }

        let mut data_min = vec![f64::INFINITY; N_FEATURES];
        let mut data_max = vec![f64::NEG_INFINITY; N_FEATURES];
        for obs in observations {
            for (column, &value) in obs.features().iter().enumerate() {
                if !value.is_finite() {
                    return Err(ScaleError::NonFiniteFit { column });
                }
                data_min[column] = data_min[column].min(value);
                data_max[column] = data_max[column].max(value);
            }
        }

        Ok(Self { data_min, data_max })
    }

    /// Load fitted parameters from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ScaleError> {
        let file = File::open(path).map_err(|source| ScaleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let scaler: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ScaleError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        scaler.validate()?;
        Ok(scaler)
    }

    fn validate(&self) -> Result<(), ScaleError> {
        if self.data_min.len() != N_FEATURES {
            return Err(ScaleError::DimensionMismatch {
                expected: N_FEATURES,
                actual: self.data_min.len(),
            });
        }
        if self.data_max.len() != N_FEATURES {
            return Err(ScaleError::DimensionMismatch {
                expected: N_FEATURES,
                actual: self.data_max.len(),
            });
        }
        for column in 0..N_FEATURES {
            let (lo, hi) = (self.data_min[column], self.data_max[column]);
            if !(lo.is_finite() && hi.is_finite()) || hi < lo {
                return Err(ScaleError::InvalidRange { column });
            }
        }
        Ok(())
    }

    /// Normalize a raw matrix (rows = days, columns = features) into `[0, 1]`.
    pub fn transform(&self, raw: &DMatrix<f64>) -> Result<DMatrix<f64>, ScaleError> {
        self.check_columns(raw)?;
        Ok(DMatrix::from_fn(raw.nrows(), raw.ncols(), |r, c| {
            (raw[(r, c)] - self.data_min[c]) * self.scale_factor(c)
        }))
    }

    /// Map a normalized matrix back to original units.
    pub fn inverse_transform(&self, scaled: &DMatrix<f64>) -> Result<DMatrix<f64>, ScaleError> {
        self.check_columns(scaled)?;
        Ok(DMatrix::from_fn(scaled.nrows(), scaled.ncols(), |r, c| {
            scaled[(r, c)] / self.scale_factor(c) + self.data_min[c]
        }))
    }

    fn check_columns(&self, m: &DMatrix<f64>) -> Result<(), ScaleError> {
        if m.ncols() != N_FEATURES {
            return Err(ScaleError::DimensionMismatch {
                expected: N_FEATURES,
                actual: m.ncols(),
            });
        }
        Ok(())
    }

    fn scale_factor(&self, column: usize) -> f64 {
        let range = self.data_max[column] - self.data_min[column];
        if range > 0.0 { 1.0 / range } else { 1.0 }
    }
}
