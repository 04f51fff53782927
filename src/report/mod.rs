//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the forecasting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{DatasetStats, Forecast, ForecastConfig, WINDOW_LEN};
use crate::forecast::Window;
use crate::io::history::HistoryData;

/// Format the full run summary (dataset stats + window + model/horizon).
pub fn format_run_summary(
    history: &HistoryData,
    window: &Window,
    model_name: &str,
    config: &ForecastConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== horizon - BTC close forecast ===\n");

    let skipped = if history.row_errors.is_empty() {
        String::new()
    } else {
        format!(" ({} rows skipped)", history.row_errors.len())
    };
    out.push_str(&format!(
        "History: n={} | {} → {}{skipped}\n",
        history.stats.n_obs, history.stats.first_date, history.stats.last_date,
    ));
    out.push_str(&format!(
        "Close: last {} | mean {} | min {} | max {}\n",
        fmt_usd(history.stats.close_last),
        fmt_usd(history.stats.close_mean),
        fmt_usd(history.stats.close_min),
        fmt_usd(history.stats.close_max),
    ));

    out.push_str(&format!(
        "Window: {} → {} ({WINDOW_LEN} days)\n",
        window.first_date(),
        window.last_date(),
    ));

    let scaler_label = match &config.scaler_path {
        Some(path) => path.display().to_string(),
        None => "fitted from history".to_string(),
    };
    out.push_str(&format!(
        "Model: {model_name} | Scaler: {scaler_label} | Horizon: {} days\n",
        config.horizon,
    ));

    out
}

/// Format the forecast table plus the next-close highlight.
pub fn format_forecast_table(forecast: &Forecast) -> String {
    let mut out = String::new();

    out.push_str("Forecast:\n");
    out.push_str(&format!("  {:<12} {}\n", "date", "close (USD)"));
    for point in &forecast.points {
        out.push_str(&format!(
            "  {:<12} {}\n",
            point.date.to_string(),
            fmt_usd(point.close)
        ));
    }

    if let Some(next) = forecast.next_close() {
        out.push('\n');
        out.push_str(&format!("Next close estimate: {}\n", fmt_usd(next)));
    }

    out
}

/// Format the historical-data summary panel.
pub fn format_history_summary(stats: &DatasetStats) -> String {
    let mut out = String::new();

    out.push_str("=== horizon - BTC history ===\n");
    out.push_str(&format!(
        "Period: {} → {}\n",
        stats.first_date, stats.last_date
    ));
    out.push_str(&format!("Records: {}\n", stats.n_obs));
    out.push_str(&format!(
        "Close: last {} | mean {} | min {} | max {}\n",
        fmt_usd(stats.close_last),
        fmt_usd(stats.close_mean),
        fmt_usd(stats.close_min),
        fmt_usd(stats.close_max),
    ));

    out
}

/// Format a USD amount with thousands separators, e.g. `US$ 98,123.46`.
fn fmt_usd(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("US$ {sign}{grouped}.{frac_part}")
}
