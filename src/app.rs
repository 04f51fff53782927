//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads (or generates) the historical data
//! - loads the trained model and scaler
//! - runs the recursive forecast
//! - prints reports and writes optional exports

use chrono::Utc;
use clap::Parser;

use crate::cli::{Command, ForecastArgs, SampleArgs, StatsArgs};
use crate::domain::ForecastConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `horizon` binary.
pub fn run() -> Result<(), AppError> {
    // We want `horizon` and `horizon -d 14` to behave like `horizon forecast ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Stats(args) => handle_stats(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args);
    let run = pipeline::run_forecast(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.history, &run.window, &run.model_name, &config)
    );
    println!("{}", crate::report::format_forecast_table(&run.forecast));

    for err in &run.history.row_errors {
        eprintln!("warning: line {}: {}", err.line, err.message);
    }

    if let Some(path) = &config.export {
        crate::io::export::write_forecast_csv(path, &run.forecast)?;
        println!("Wrote forecast CSV: {}", path.display());
    }

    Ok(())
}

fn handle_stats(args: StatsArgs) -> Result<(), AppError> {
    let source = if args.synthetic {
        pipeline::HistorySource::Synthetic {
            days: args.synthetic_days,
            seed: args.seed,
        }
    } else {
        pipeline::HistorySource::Csv(args.history)
    };
    let history = source.load()?;

    println!("{}", crate::report::format_history_summary(&history.stats));

    for err in &history.row_errors {
        eprintln!("warning: line {}: {}", err.line, err.message);
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let sample = crate::data::SampleConfig {
        days: args.days,
        seed: args.seed,
        end_date: Utc::now().date_naive(),
    };
    let observations = crate::data::generate_history(&sample)?;
    crate::io::export::write_history_csv(&args.out, &observations)?;

    println!(
        "Wrote {} synthetic observations to {}",
        observations.len(),
        args.out.display()
    );
    Ok(())
}

pub fn forecast_config_from_args(args: &ForecastArgs) -> ForecastConfig {
    ForecastConfig {
        history_path: args.history.clone(),
        model_path: args.model.clone(),
        scaler_path: args.scaler.clone(),
        horizon: args.days,
        export: args.export.clone(),
        synthetic: args.synthetic,
        synthetic_days: args.synthetic_days,
        sample_seed: args.seed,
    }
}

/// Rewrite argv so `horizon` defaults to `horizon forecast`.
///
/// Rules:
/// - `horizon`                     -> `horizon forecast`
/// - `horizon -d 14 ...`           -> `horizon forecast -d 14 ...`
/// - `horizon --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("forecast".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "forecast" | "stats" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "forecast flags".
    if arg1.starts_with('-') {
        argv.insert(1, "forecast".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("horizon")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn bare_invocation_defaults_to_forecast() {
        assert_eq!(rewrite_args(argv(&[])), argv(&["forecast"]));
    }

    #[test]
    fn leading_flag_is_treated_as_forecast_flags() {
        assert_eq!(
            rewrite_args(argv(&["-d", "14"])),
            argv(&["forecast", "-d", "14"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["stats"])), argv(&["stats"]));
        assert_eq!(rewrite_args(argv(&["--help"])), argv(&["--help"]));
    }
}
