//! Shared "forecast pipeline" logic used by the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! history load/generate -> scaler -> model -> window -> recursive forecast
//!
//! The subcommands can then focus on presentation (printing vs exporting).
//!
//! Model and scaler are loaded once per run and passed down explicitly; no
//! process-wide caches.

use std::path::PathBuf;

use chrono::Utc;

use crate::data::{SampleConfig, generate_history};
use crate::domain::{Forecast, ForecastConfig};
use crate::error::AppError;
use crate::forecast::{Window, recursive_forecast};
use crate::io::history::{HistoryData, load_history};
use crate::model::{LstmModel, SequenceModel};
use crate::scale::MinMaxScaler;

/// Where historical observations come from for this run.
pub enum HistorySource {
    Csv(PathBuf),
    Synthetic { days: usize, seed: u64 },
}

impl HistorySource {
    pub fn load(&self) -> Result<HistoryData, AppError> {
        match self {
            HistorySource::Csv(path) => load_history(path),
            HistorySource::Synthetic { days, seed } => {
                let sample = SampleConfig {
                    days: *days,
                    seed: *seed,
                    end_date: Utc::now().date_naive(),
                };
                HistoryData::from_observations(generate_history(&sample)?)
            }
        }
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        if config.synthetic {
            HistorySource::Synthetic {
                days: config.synthetic_days,
                seed: config.sample_seed,
            }
        } else {
            HistorySource::Csv(config.history_path.clone())
        }
    }
}

/// All computed outputs of a single forecast run.
pub struct RunOutput {
    pub history: HistoryData,
    pub window: Window,
    pub forecast: Forecast,
    pub model_name: String,
}

/// Execute the full forecasting pipeline and return the computed outputs.
pub fn run_forecast(config: &ForecastConfig) -> Result<RunOutput, AppError> {
    let history = HistorySource::from_config(config).load()?;

    let scaler = match &config.scaler_path {
        Some(path) => MinMaxScaler::load(path)?,
        None => MinMaxScaler::fit(&history.observations)?,
    };
    let model = LstmModel::load(&config.model_path)?;

    let window = Window::from_trailing(&history.observations)?;
    let forecast = recursive_forecast(&model, &scaler, &window, config.horizon)?;

    Ok(RunOutput {
        history,
        window,
        forecast,
        model_name: model.name().to_string(),
    })
}
