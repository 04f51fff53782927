//! Synthetic daily history generation.
//!
//! Produces a seeded, reproducible stand-in for the collector's output:
//! geometric random walks for the BTC and ETH closes (correlated), a
//! mean-reverting bounded walk for the Fear & Greed index, and a slow walk
//! for the dollar index.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::Observation;
use crate::error::AppError;

/// Daily log-volatility of the BTC close.
const BTC_VOL: f64 = 0.035;
/// Daily log-volatility of the ETH close.
const ETH_VOL: f64 = 0.045;
/// Correlation between BTC and ETH daily shocks.
const BTC_ETH_CORR: f64 = 0.7;
/// Daily log-volatility of the dollar index.
const DXY_VOL: f64 = 0.004;
/// Mean-reversion rate of the Fear & Greed index toward its neutral level.
const FGI_REVERSION: f64 = 0.12;
/// Daily shock size of the Fear & Greed index, in index points.
const FGI_SHOCK: f64 = 6.0;

const START_CLOSE: f64 = 95_000.0;
const START_ETH: f64 = 2_600.0;
const START_DXY: f64 = 104.0;
const START_FGI: f64 = 55.0;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Number of daily observations to generate.
    pub days: usize,
    pub seed: u64,
    /// Date of the newest generated observation.
    pub end_date: NaiveDate,
}

/// Generate a chronologically sorted synthetic history.
pub fn generate_history(config: &SampleConfig) -> Result<Vec<Observation>, AppError> {
    if config.days == 0 {
        return Err(AppError::new(2, "Sample day count must be > 0."));
    }

    let start_date = config
        .end_date
        .checked_sub_signed(Duration::days(config.days as i64 - 1))
        .ok_or_else(|| AppError::new(2, "Sample date range underflows the calendar."))?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut close = START_CLOSE;
    let mut eth_close = START_ETH;
    let mut dxy = START_DXY;
    let mut fgi = START_FGI;

    let mut observations = Vec::with_capacity(config.days);
    for i in 0..config.days {
        let date = start_date + Duration::days(i as i64);
        observations.push(Observation {
            date,
            close,
            fgi,
            eth_close,
            dxy,
        });

        let z_btc: f64 = normal.sample(&mut rng);
        let z_indep: f64 = normal.sample(&mut rng);
        let z_dxy: f64 = normal.sample(&mut rng);
        let z_fgi: f64 = normal.sample(&mut rng);

        // ETH shares part of the BTC shock, plus an independent component
        // scaled so the combined shock stays unit-variance.
        let z_eth = BTC_ETH_CORR * z_btc + (1.0 - BTC_ETH_CORR * BTC_ETH_CORR).sqrt() * z_indep;

        close *= (BTC_VOL * z_btc).exp();
        eth_close *= (ETH_VOL * z_eth).exp();
        dxy *= (DXY_VOL * z_dxy).exp();
        fgi = (fgi + FGI_REVERSION * (50.0 - fgi) + FGI_SHOCK * z_fgi).clamp(0.0, 100.0);
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(days: usize, seed: u64) -> SampleConfig {
        SampleConfig {
            days,
            seed,
            end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        }
    }

    #[test]
    fn generates_contiguous_days_ending_at_the_requested_date() {
        let history = generate_history(&config(90, 7)).unwrap();

        assert_eq!(history.len(), 90);
        assert_eq!(
            history.last().unwrap().date,
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
        );
        for pair in history.windows(2) {
            assert_eq!(pair[1].date, pair[0].date + Duration::days(1));
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_history() {
        let a = generate_history(&config(60, 42)).unwrap();
        let b = generate_history(&config(60, 42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = generate_history(&config(60, 1)).unwrap();
        let b = generate_history(&config(60, 2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn values_stay_in_plausible_ranges() {
        let history = generate_history(&config(365, 3)).unwrap();
        for obs in &history {
            assert!(obs.close > 0.0);
            assert!(obs.eth_close > 0.0);
            assert!(obs.dxy > 0.0);
            assert!((0.0..=100.0).contains(&obs.fgi));
            assert!(obs.is_finite());
        }
    }

    #[test]
    fn zero_days_is_rejected() {
        let err = generate_history(&config(0, 42)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
