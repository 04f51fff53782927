//! Sequence model contract and trained-model loading.
//!
//! Training happens upstream (the exported weight file is produced there);
//! this crate only replays a trained network at inference time. The model is
//! passed explicitly to the forecaster rather than held in a process-wide
//! singleton, so tests can substitute stubs and callers own the lifecycle.

pub mod lstm;

pub use lstm::LstmModel;

use nalgebra::DMatrix;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model expects a {expected_rows}x{expected_cols} input window, got {rows}x{cols}")]
    BadInputShape {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },
    #[error("inconsistent model dimensions: {0}")]
    BadDimensions(String),
    #[error("model produced a non-finite prediction")]
    NonFiniteOutput,
    #[error("failed to read model file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse model file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// A trained single-step sequence regressor.
///
/// `state` is a normalized `WINDOW_LEN x N_FEATURES` matrix, rows ordered
/// oldest to newest. The return value is the normalized next-day close; the
/// caller owns denormalization.
pub trait SequenceModel {
    fn predict_next(&self, state: &DMatrix<f64>) -> Result<f64, ModelError>;

    /// Human-readable label for reports.
    fn name(&self) -> &str;
}
