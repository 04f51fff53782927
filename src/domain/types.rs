//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during forecasting
//! - exported to CSV/JSON
//! - reloaded later for comparisons

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of trailing observations the model consumes per prediction.
pub const WINDOW_LEN: usize = 20;

/// Feature columns per observation: the close plus three exogenous signals.
pub const N_FEATURES: usize = 4;

/// Canonical feature column order.
///
/// The scaler and the model weight file are both fitted against this exact
/// order; reordering it silently corrupts every downstream prediction.
pub const FEATURE_NAMES: [&str; N_FEATURES] = ["close", "fgi", "eth_close", "dxy"];

/// One daily market observation.
///
/// All four numeric fields must be present; rows with missing or non-finite
/// values are rejected during ingest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// BTC-USD daily close (the forecast target).
    pub close: f64,
    /// Fear & Greed index (0-100).
    pub fgi: f64,
    /// ETH-USD daily close.
    pub eth_close: f64,
    /// US dollar index.
    pub dxy: f64,
}

impl Observation {
    /// Feature vector in the canonical column order.
    pub fn features(&self) -> [f64; N_FEATURES] {
        [self.close, self.fgi, self.eth_close, self.dxy]
    }

    pub fn is_finite(&self) -> bool {
        self.features().iter().all(|v| v.is_finite())
    }
}

/// A single forecast step, in original (denormalized) units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// An ordered multi-day forecast of the close price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The first forecast step (the "next close" headline number).
    pub fn next_close(&self) -> Option<f64> {
        self.points.first().map(|p| p.close)
    }
}

/// Summary stats about the history actually used for forecasting.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_obs: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub close_last: f64,
    pub close_mean: f64,
    pub close_min: f64,
    pub close_max: f64,
}

impl DatasetStats {
    /// Compute stats over chronologically sorted observations.
    ///
    /// Returns `None` for an empty slice; callers decide whether that is fatal.
    pub fn from_observations(observations: &[Observation]) -> Option<Self> {
        let first = observations.first()?;
        let last = observations.last()?;

        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for obs in observations {
            sum += obs.close;
            min = min.min(obs.close);
            max = max.max(obs.close);
        }

        Some(Self {
            n_obs: observations.len(),
            first_date: first.date,
            last_date: last.date,
            close_last: last.close,
            close_mean: sum / observations.len() as f64,
            close_min: min,
            close_max: max,
        })
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub history_path: PathBuf,
    pub model_path: PathBuf,
    /// Fitted scaler parameters; fitted from the history when absent.
    pub scaler_path: Option<PathBuf>,
    /// Days ahead to forecast.
    pub horizon: usize,
    pub export: Option<PathBuf>,

    /// Use generated synthetic history instead of reading a CSV.
    pub synthetic: bool,
    pub synthetic_days: usize,
    pub sample_seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(day: u32, close: f64) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            close,
            fgi: 50.0,
            eth_close: 2500.0,
            dxy: 104.0,
        }
    }

    #[test]
    fn stats_over_sorted_observations() {
        let observations = vec![obs(1, 100.0), obs(2, 110.0), obs(3, 90.0)];
        let stats = DatasetStats::from_observations(&observations).unwrap();

        assert_eq!(stats.n_obs, 3);
        assert_eq!(stats.first_date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(stats.last_date, NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
        assert!((stats.close_last - 90.0).abs() < 1e-12);
        assert!((stats.close_mean - 100.0).abs() < 1e-12);
        assert!((stats.close_min - 90.0).abs() < 1e-12);
        assert!((stats.close_max - 110.0).abs() < 1e-12);
    }

    #[test]
    fn stats_of_empty_history_is_none() {
        assert!(DatasetStats::from_observations(&[]).is_none());
    }

    #[test]
    fn feature_order_matches_declared_names() {
        let o = obs(1, 1.0);
        let f = o.features();
        assert_eq!(f.len(), FEATURE_NAMES.len());
        assert!((f[0] - o.close).abs() < 1e-12);
        assert!((f[1] - o.fgi).abs() < 1e-12);
        assert!((f[2] - o.eth_close).abs() < 1e-12);
        assert!((f[3] - o.dxy).abs() < 1e-12);
    }
}
