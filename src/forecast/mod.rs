//! Recursive multi-step forecasting.
//!
//! The model only knows how to predict the *next* normalized close from a
//! `WINDOW_LEN x N_FEATURES` window. Longer horizons are produced by feeding
//! each prediction back in as input:
//!
//! 1. normalize the trailing window into a working state matrix
//! 2. predict one step, record it, and append a new row built from the
//!    prediction plus the exogenous values of the latest state row
//! 3. drop the oldest row so the state stays `WINDOW_LEN` long
//! 4. repeat for the whole horizon, then denormalize the recorded closes
//!
//! Because step 2 copies the exogenous columns from the latest *state* row
//! (not from the original window) and only the close column is ever replaced,
//! the exogenous signals stay frozen at their last observed values across the
//! horizon. That behavior is a property of the update rule itself; substituting
//! an explicit exogenous projection here changes every downstream prediction.
//!
//! Each step strictly depends on the previous one, so the loop is sequential
//! and blocking; the model is invoked exactly `horizon` times per call. The
//! routine holds no state between calls and fails fast: a single malformed
//! input would poison every later window slide, so nothing partial is returned.

use chrono::{Duration, NaiveDate};
use nalgebra::{DMatrix, RowDVector};
use thiserror::Error;

use crate::domain::{Forecast, ForecastPoint, N_FEATURES, Observation, WINDOW_LEN};
use crate::model::{ModelError, SequenceModel};
use crate::scale::{MinMaxScaler, ScaleError};

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("expected a window of {expected} observations, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("insufficient history: need at least {needed} observations, got {available}")]
    InsufficientHistory { needed: usize, available: usize },
    #[error("forecast horizon must be at least 1 day")]
    InvalidHorizon,
    #[error("model inference failed: {0}")]
    Model(#[from] ModelError),
    #[error("feature scaling failed: {0}")]
    Scaler(#[from] ScaleError),
    #[error("forecast dates exceed the supported calendar range")]
    CalendarOverflow,
}

/// A fixed-length trailing window of observations, oldest first.
///
/// Length is enforced at construction so the forecaster can rely on it; a
/// wrong-sized window never reaches the model.
#[derive(Debug, Clone)]
pub struct Window {
    observations: Vec<Observation>,
}

impl Window {
    pub fn new(observations: Vec<Observation>) -> Result<Self, ForecastError> {
        if observations.len() != WINDOW_LEN {
            return Err(ForecastError::ShapeMismatch {
                expected: WINDOW_LEN,
                actual: observations.len(),
            });
        }
        Ok(Self { observations })
    }

    /// Take the most recent `WINDOW_LEN` observations from a sorted history.
    pub fn from_trailing(history: &[Observation]) -> Result<Self, ForecastError> {
        if history.len() < WINDOW_LEN {
            return Err(ForecastError::InsufficientHistory {
                needed: WINDOW_LEN,
                available: history.len(),
            });
        }
        Ok(Self {
            observations: history[history.len() - WINDOW_LEN..].to_vec(),
        })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn first_date(&self) -> NaiveDate {
        self.observations[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.observations[WINDOW_LEN - 1].date
    }

    /// Raw feature matrix, rows ordered oldest to newest.
    fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(WINDOW_LEN, N_FEATURES, |r, c| {
            self.observations[r].features()[c]
        })
    }
}

/// Produce an iterative `horizon`-day forecast of the close price.
///
/// The result pairs one calendar date per step (starting the day after the
/// window's last date) with the denormalized predicted close. Identical
/// inputs yield identical output as long as the model is deterministic.
pub fn recursive_forecast(
    model: &dyn SequenceModel,
    scaler: &MinMaxScaler,
    window: &Window,
    horizon: usize,
) -> Result<Forecast, ForecastError> {
    if horizon == 0 {
        return Err(ForecastError::InvalidHorizon);
    }

    let mut state = scaler.transform(&window.to_matrix())?;
    if state.nrows() != WINDOW_LEN || state.ncols() != N_FEATURES {
        return Err(ForecastError::ShapeMismatch {
            expected: WINDOW_LEN,
            actual: state.nrows(),
        });
    }

    let mut normalized = Vec::with_capacity(horizon);
    let mut dates = Vec::with_capacity(horizon);
    let mut current = next_day(window.last_date())?;
    let last = WINDOW_LEN - 1;

    for _ in 0..horizon {
        let p = model.predict_next(&state)?;
        normalized.push(p);
        dates.push(current);

        // Next input row: the prediction, plus the exogenous values of the
        // latest state row. Only the close column ever changes.
        let next_row = RowDVector::from_row_slice(&[
            p,
            state[(last, 1)],
            state[(last, 2)],
            state[(last, 3)],
        ]);

        // Slide: drop the oldest row, append the new one.
        for r in 0..last {
            let row = state.row(r + 1).into_owned();
            state.set_row(r, &row);
        }
        state.set_row(last, &next_row);

        current = next_day(current)?;
    }

    // Denormalize the recorded closes. The exogenous slots were never filled
    // with real normalized values, so they are zero-padded here and their
    // inverse-transformed columns are discarded; only the close column is read.
    let mut padded = DMatrix::zeros(horizon, N_FEATURES);
    for (r, &p) in normalized.iter().enumerate() {
        padded[(r, 0)] = p;
    }
    let denormalized = scaler.inverse_transform(&padded)?;

    let points = dates
        .into_iter()
        .zip(denormalized.column(0).iter())
        .map(|(date, &close)| ForecastPoint { date, close })
        .collect();

    Ok(Forecast { points })
}

fn next_day(date: NaiveDate) -> Result<NaiveDate, ForecastError> {
    date.checked_add_signed(Duration::days(1))
        .ok_or(ForecastError::CalendarOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Predicts the normalized close of the latest window row.
    struct LastCloseModel;

    impl SequenceModel for LastCloseModel {
        fn predict_next(&self, state: &DMatrix<f64>) -> Result<f64, ModelError> {
            Ok(state[(state.nrows() - 1, 0)])
        }

        fn name(&self) -> &str {
            "last-close"
        }
    }

    /// Adds a fixed normalized increment to the latest close.
    struct DriftModel {
        step: f64,
    }

    impl SequenceModel for DriftModel {
        fn predict_next(&self, state: &DMatrix<f64>) -> Result<f64, ModelError> {
            Ok(state[(state.nrows() - 1, 0)] + self.step)
        }

        fn name(&self) -> &str {
            "drift"
        }
    }

    /// Records every state it is handed (and returns a constant).
    struct RecordingModel {
        states: RefCell<Vec<DMatrix<f64>>>,
    }

    impl RecordingModel {
        fn new() -> Self {
            Self {
                states: RefCell::new(Vec::new()),
            }
        }
    }

    impl SequenceModel for RecordingModel {
        fn predict_next(&self, state: &DMatrix<f64>) -> Result<f64, ModelError> {
            self.states.borrow_mut().push(state.clone());
            Ok(0.5)
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    /// Counts invocations without predicting anything useful.
    struct CountingModel {
        calls: RefCell<usize>,
    }

    impl SequenceModel for CountingModel {
        fn predict_next(&self, _state: &DMatrix<f64>) -> Result<f64, ModelError> {
            *self.calls.borrow_mut() += 1;
            Ok(0.0)
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn obs(date: NaiveDate, close: f64) -> Observation {
        Observation {
            date,
            close,
            fgi: 55.0,
            eth_close: 2500.0,
            dxy: 104.0,
        }
    }

    /// Closes 100, 101, ..., 119 on consecutive days; constant exogenous.
    fn linear_window() -> Window {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let observations = (0..WINDOW_LEN)
            .map(|i| obs(start + Duration::days(i as i64), 100.0 + i as f64))
            .collect();
        Window::new(observations).unwrap()
    }

    fn fitted_scaler(window: &Window) -> MinMaxScaler {
        MinMaxScaler::fit(window.observations()).unwrap()
    }

    #[test]
    fn forecast_has_one_point_per_horizon_day() {
        let window = linear_window();
        let scaler = fitted_scaler(&window);

        for horizon in [1usize, 7, 30] {
            let forecast = recursive_forecast(&LastCloseModel, &scaler, &window, horizon).unwrap();
            assert_eq!(forecast.len(), horizon);
        }
    }

    #[test]
    fn dates_advance_one_calendar_day_from_window_end() {
        let window = linear_window();
        let scaler = fitted_scaler(&window);
        let forecast = recursive_forecast(&LastCloseModel, &scaler, &window, 7).unwrap();

        let mut expected = window.last_date();
        for point in &forecast.points {
            expected = expected.succ_opt().unwrap();
            assert_eq!(point.date, expected);
        }
    }

    #[test]
    fn horizon_one_equals_a_single_direct_prediction() {
        let window = linear_window();
        let scaler = fitted_scaler(&window);

        let forecast = recursive_forecast(&LastCloseModel, &scaler, &window, 1).unwrap();
        assert_eq!(forecast.len(), 1);

        // The stub returns the normalized last close (1.0 for the linear
        // window), which denormalizes back to the last observed close.
        assert!((forecast.points[0].close - 119.0).abs() < 1e-9);
    }

    #[test]
    fn trend_following_stub_stays_flat_at_the_last_close() {
        let window = linear_window();
        let scaler = fitted_scaler(&window);
        let forecast = recursive_forecast(&LastCloseModel, &scaler, &window, 10).unwrap();

        let mut prev = f64::NEG_INFINITY;
        for point in &forecast.points {
            assert!(point.close >= prev, "forecast must be non-decreasing");
            assert!((point.close - 119.0).abs() < 1e-9);
            prev = point.close;
        }
    }

    #[test]
    fn predictions_feed_back_into_later_steps() {
        let window = linear_window();
        let scaler = fitted_scaler(&window);
        let model = DriftModel { step: 0.01 };
        let forecast = recursive_forecast(&model, &scaler, &window, 5).unwrap();

        // Each step adds 0.01 normalized = 0.19 in raw units on this window.
        for (i, point) in forecast.points.iter().enumerate() {
            let expected = 119.0 + 0.19 * (i + 1) as f64;
            assert!(
                (point.close - expected).abs() < 1e-9,
                "step {i}: {} vs {expected}",
                point.close
            );
        }
    }

    #[test]
    fn identical_inputs_yield_identical_forecasts() {
        let window = linear_window();
        let scaler = fitted_scaler(&window);

        let a = recursive_forecast(&LastCloseModel, &scaler, &window, 7).unwrap();
        let b = recursive_forecast(&LastCloseModel, &scaler, &window, 7).unwrap();
        assert_eq!(a.points, b.points);
    }

    #[test]
    fn exogenous_columns_stay_frozen_across_the_horizon() {
        let window = linear_window();
        let scaler = fitted_scaler(&window);
        let model = RecordingModel::new();

        recursive_forecast(&model, &scaler, &window, 6).unwrap();

        let states = model.states.borrow();
        assert_eq!(states.len(), 6);

        let last = WINDOW_LEN - 1;
        let frozen: Vec<f64> = (1..N_FEATURES).map(|c| states[0][(last, c)]).collect();
        for (step, state) in states.iter().enumerate() {
            assert_eq!(state.nrows(), WINDOW_LEN);
            assert_eq!(state.ncols(), N_FEATURES);
            for (idx, c) in (1..N_FEATURES).enumerate() {
                assert!(
                    (state[(last, c)] - frozen[idx]).abs() < 1e-12,
                    "exogenous column {c} drifted at step {step}"
                );
            }
        }
    }

    #[test]
    fn short_window_is_rejected_at_construction() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let observations: Vec<Observation> = (0..WINDOW_LEN - 1)
            .map(|i| obs(start + Duration::days(i as i64), 100.0))
            .collect();

        let err = Window::new(observations).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::ShapeMismatch {
                expected: 20,
                actual: 19
            }
        ));
    }

    #[test]
    fn trailing_window_requires_enough_history() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let history: Vec<Observation> = (0..5)
            .map(|i| obs(start + Duration::days(i as i64), 100.0))
            .collect();

        let err = Window::from_trailing(&history).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientHistory {
                needed: 20,
                available: 5
            }
        ));
    }

    #[test]
    fn trailing_window_takes_the_most_recent_observations() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let history: Vec<Observation> = (0..50)
            .map(|i| obs(start + Duration::days(i as i64), i as f64))
            .collect();

        let window = Window::from_trailing(&history).unwrap();
        assert_eq!(window.observations().len(), WINDOW_LEN);
        assert_eq!(window.first_date(), start + Duration::days(30));
        assert_eq!(window.last_date(), start + Duration::days(49));
    }

    #[test]
    fn zero_horizon_fails_without_invoking_the_model() {
        let window = linear_window();
        let scaler = fitted_scaler(&window);
        let model = CountingModel {
            calls: RefCell::new(0),
        };

        let err = recursive_forecast(&model, &scaler, &window, 0).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidHorizon));
        assert_eq!(*model.calls.borrow(), 0);
    }
}
