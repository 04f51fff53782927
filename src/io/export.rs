//! CSV exports of forecasts and generated histories.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream
//! scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Forecast, Observation};
use crate::error::AppError;

/// Write the forecast as `date,close` CSV.
pub fn write_forecast_csv(path: &Path, forecast: &Forecast) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create forecast CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(file, "date,close")
        .map_err(|e| AppError::new(2, format!("Failed to write forecast CSV header: {e}")))?;

    for point in &forecast.points {
        writeln!(file, "{},{:.2}", point.date, point.close)
            .map_err(|e| AppError::new(2, format!("Failed to write forecast CSV row: {e}")))?;
    }

    Ok(())
}

/// Write observations in the history schema the ingest side reads back.
pub fn write_history_csv(path: &Path, observations: &[Observation]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create history CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(file, "date,close,fgi,eth_close,dxy")
        .map_err(|e| AppError::new(2, format!("Failed to write history CSV header: {e}")))?;

    for obs in observations {
        writeln!(
            file,
            "{},{:.2},{:.2},{:.2},{:.4}",
            obs.date, obs.close, obs.fgi, obs.eth_close, obs.dxy
        )
        .map_err(|e| AppError::new(2, format!("Failed to write history CSV row: {e}")))?;
    }

    Ok(())
}
