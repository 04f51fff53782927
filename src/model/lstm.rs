//! LSTM forward pass over exported weights.
//!
//! The weight file is a JSON export of the trained network in the layout the
//! training stack uses for a single recurrent layer plus a dense head:
//!
//! - `kernel`: `input_size x 4*hidden_size` (input-to-gates)
//! - `recurrent_kernel`: `hidden_size x 4*hidden_size` (hidden-to-gates)
//! - `bias`: `4*hidden_size`
//! - `head_kernel` / `head_bias`: dense map from the final hidden state to
//!   the single normalized output
//!
//! Gate blocks are ordered input / forget / cell / output. Dimensions are
//! validated once at load time so `predict_next` stays panic-free.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::{DMatrix, DVector};
use serde::Deserialize;

use super::{ModelError, SequenceModel};
use crate::domain::{N_FEATURES, WINDOW_LEN};

#[derive(Debug, Deserialize)]
struct LstmWeightsFile {
    input_size: usize,
    hidden_size: usize,
    /// `input_size` rows of `4*hidden_size` values each.
    kernel: Vec<Vec<f64>>,
    /// `hidden_size` rows of `4*hidden_size` values each.
    recurrent_kernel: Vec<Vec<f64>>,
    bias: Vec<f64>,
    head_kernel: Vec<f64>,
    head_bias: f64,
}

/// A single-layer LSTM with a scalar dense head.
#[derive(Debug)]
pub struct LstmModel {
    hidden: usize,
    /// `4H x input` — kernel transposed so each step is a matrix-vector product.
    w: DMatrix<f64>,
    /// `4H x H` — recurrent kernel, transposed likewise.
    u: DMatrix<f64>,
    b: DVector<f64>,
    head_w: DVector<f64>,
    head_b: f64,
    name: String,
}

impl LstmModel {
    /// Load and validate an exported weight file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let file = File::open(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let weights: LstmWeightsFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ModelError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "lstm".to_string());
        Self::from_weights(weights, name)
    }

    fn from_weights(weights: LstmWeightsFile, name: String) -> Result<Self, ModelError> {
        if weights.input_size != N_FEATURES {
            return Err(ModelError::BadDimensions(format!(
                "input_size must be {N_FEATURES}, got {}",
                weights.input_size
            )));
        }
        if weights.hidden_size == 0 {
            return Err(ModelError::BadDimensions("hidden_size must be > 0".into()));
        }

        let h = weights.hidden_size;
        let gates = 4 * h;

        check_matrix("kernel", &weights.kernel, weights.input_size, gates)?;
        check_matrix("recurrent_kernel", &weights.recurrent_kernel, h, gates)?;
        if weights.bias.len() != gates {
            return Err(ModelError::BadDimensions(format!(
                "bias must have {gates} values, got {}",
                weights.bias.len()
            )));
        }
        if weights.head_kernel.len() != h {
            return Err(ModelError::BadDimensions(format!(
                "head_kernel must have {h} values, got {}",
                weights.head_kernel.len()
            )));
        }

        // Transpose the stored row layout into gates-by-input matrices.
        let w = DMatrix::from_fn(gates, weights.input_size, |g, i| weights.kernel[i][g]);
        let u = DMatrix::from_fn(gates, h, |g, j| weights.recurrent_kernel[j][g]);
        let b = DVector::from_vec(weights.bias);
        let head_w = DVector::from_vec(weights.head_kernel);

        Ok(Self {
            hidden: h,
            w,
            u,
            b,
            head_w,
            head_b: weights.head_bias,
            name,
        })
    }

    /// One recurrence step: consume feature row `x`, update `(h, c)` in place.
    fn step(&self, x: &DVector<f64>, h: &mut DVector<f64>, c: &mut DVector<f64>) {
        let z = &self.w * x + &self.u * &*h + &self.b;

        let n = self.hidden;
        let i = z.rows(0, n).map(sigmoid);
        let f = z.rows(n, n).map(sigmoid);
        let g = z.rows(2 * n, n).map(f64::tanh);
        let o = z.rows(3 * n, n).map(sigmoid);

        *c = f.component_mul(&*c) + i.component_mul(&g);
        *h = o.component_mul(&c.map(f64::tanh));
    }
}

impl SequenceModel for LstmModel {
    fn predict_next(&self, state: &DMatrix<f64>) -> Result<f64, ModelError> {
        if state.nrows() != WINDOW_LEN || state.ncols() != N_FEATURES {
            return Err(ModelError::BadInputShape {
                expected_rows: WINDOW_LEN,
                expected_cols: N_FEATURES,
                rows: state.nrows(),
                cols: state.ncols(),
            });
        }

        let mut h = DVector::zeros(self.hidden);
        let mut c = DVector::zeros(self.hidden);
        for r in 0..state.nrows() {
            let x: DVector<f64> = state.row(r).transpose();
            self.step(&x, &mut h, &mut c);
        }

        let y = self.head_w.dot(&h) + self.head_b;
        if !y.is_finite() {
            return Err(ModelError::NonFiniteOutput);
        }
        Ok(y)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn check_matrix(
    label: &str,
    rows: &[Vec<f64>],
    expected_rows: usize,
    expected_cols: usize,
) -> Result<(), ModelError> {
    if rows.len() != expected_rows {
        return Err(ModelError::BadDimensions(format!(
            "{label} must have {expected_rows} rows, got {}",
            rows.len()
        )));
    }
    for (idx, row) in rows.iter().enumerate() {
        if row.len() != expected_cols {
            return Err(ModelError::BadDimensions(format!(
                "{label} row {idx} must have {expected_cols} values, got {}",
                row.len()
            )));
        }
    }
    Ok(())
}
