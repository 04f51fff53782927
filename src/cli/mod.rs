//! Command-line parsing for the BTC close forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the forecasting/inference code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "horizon", version, about = "Recursive BTC close forecaster (LSTM-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast the next days' closes and print the table + run summary.
    Forecast(ForecastArgs),
    /// Print summary statistics for the historical data only.
    Stats(StatsArgs),
    /// Generate a synthetic history CSV (stand-in for the collector).
    Sample(SampleArgs),
}

/// Common options for forecasting.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// Historical observations CSV (date, close, fgi, eth_close, dxy).
    #[arg(long, default_value = "data/btc_history.csv")]
    pub history: PathBuf,

    /// Trained LSTM weight file (JSON export).
    #[arg(long, default_value = "models/lstm_btc.json")]
    pub model: PathBuf,

    /// Fitted scaler parameters (JSON). Fitted from the history when omitted.
    #[arg(long)]
    pub scaler: Option<PathBuf>,

    /// Days ahead to forecast.
    #[arg(short = 'd', long, default_value_t = 7)]
    pub days: usize,

    /// Export the forecast to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Use generated synthetic history instead of reading a CSV.
    #[arg(long)]
    pub synthetic: bool,

    /// Number of synthetic days to generate.
    #[arg(long, default_value_t = 365)]
    pub synthetic_days: usize,

    /// Random seed for synthetic history.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Options for the history summary.
#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Historical observations CSV (date, close, fgi, eth_close, dxy).
    #[arg(long, default_value = "data/btc_history.csv")]
    pub history: PathBuf,

    /// Use generated synthetic history instead of reading a CSV.
    #[arg(long)]
    pub synthetic: bool,

    /// Number of synthetic days to generate.
    #[arg(long, default_value_t = 365)]
    pub synthetic_days: usize,

    /// Random seed for synthetic history.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Options for synthetic history generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV", default_value = "data/btc_history.csv")]
    pub out: PathBuf,

    /// Number of daily observations to generate.
    #[arg(long, default_value_t = 365)]
    pub days: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
