//! History CSV ingest and validation.
//!
//! This module turns a daily-observations CSV into a clean, chronologically
//! sorted list of `Observation`s that are safe to window and forecast from.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (stable sort, no hidden fallbacks)
//! - **Separation of concerns**: no scaling or forecasting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{DatasetStats, Observation};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: sorted observations + stats + row errors.
#[derive(Debug, Clone)]
pub struct HistoryData {
    pub observations: Vec<Observation>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl HistoryData {
    /// Wrap observations that were produced in-process (synthetic history).
    pub fn from_observations(observations: Vec<Observation>) -> Result<Self, AppError> {
        let stats = DatasetStats::from_observations(&observations)
            .ok_or_else(|| AppError::new(3, "No observations available."))?;
        let n = observations.len();
        Ok(Self {
            observations,
            stats,
            row_errors: Vec::new(),
            rows_read: n,
            rows_used: n,
        })
    }
}

/// Load and validate a history CSV from disk.
pub fn load_history(path: &Path) -> Result<HistoryData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open history CSV '{}': {e}", path.display()),
        )
    })?;
    read_history(file)
}

/// Read and validate history CSV from any reader.
pub fn read_history<R: Read>(input: R) -> Result<HistoryData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let columns = resolve_columns(&header_map)?;

    let mut rows: Vec<(usize, Observation)> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &columns) {
            Ok(obs) => rows.push((line, obs)),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    // Sort chronologically; duplicate dates would silently corrupt the
    // trailing window, so the later occurrence is dropped and reported.
    rows.sort_by_key(|(_, obs)| obs.date);

    let mut observations: Vec<Observation> = Vec::with_capacity(rows.len());
    for (line, obs) in rows {
        if observations.last().is_some_and(|prev| prev.date == obs.date) {
            row_errors.push(RowError {
                line,
                message: format!("duplicate date {}", obs.date),
            });
            continue;
        }
        observations.push(obs);
    }

    let rows_used = observations.len();
    let stats = DatasetStats::from_observations(&observations).ok_or_else(|| {
        AppError::new(3, "No valid observations remain after validation.")
    })?;

    Ok(HistoryData {
        observations,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

struct ColumnIndices {
    date: usize,
    close: usize,
    fgi: usize,
    eth_close: usize,
    dxy: usize,
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header (e.g. "\u{feff}date"). If we don't strip it, schema
    // validation will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<ColumnIndices, AppError> {
    Ok(ColumnIndices {
        date: require_column(header_map, &["date"])?,
        // Collector exports label the target column `btc_close`.
        close: require_column(header_map, &["close", "btc_close"])?,
        fgi: require_column(header_map, &["fgi"])?,
        eth_close: require_column(header_map, &["eth_close"])?,
        dxy: require_column(header_map, &["dxy"])?,
    })
}

fn require_column(
    header_map: &HashMap<String, usize>,
    names: &[&str],
) -> Result<usize, AppError> {
    names
        .iter()
        .find_map(|name| header_map.get(*name).copied())
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("Missing required CSV column '{}'.", names.join("' / '")),
            )
        })
}

fn parse_row(record: &StringRecord, columns: &ColumnIndices) -> Result<Observation, String> {
    let date = parse_date(field(record, columns.date, "date")?)?;
    let obs = Observation {
        date,
        close: parse_number(field(record, columns.close, "close")?, "close")?,
        fgi: parse_number(field(record, columns.fgi, "fgi")?, "fgi")?,
        eth_close: parse_number(field(record, columns.eth_close, "eth_close")?, "eth_close")?,
        dxy: parse_number(field(record, columns.dxy, "dxy")?, "dxy")?,
    };
    Ok(obs)
}

fn field<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .ok_or_else(|| format!("missing '{name}' field"))
}

fn parse_number(raw: &str, name: &str) -> Result<f64, String> {
    if raw.is_empty() {
        return Err(format!("empty '{name}' value"));
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("invalid '{name}' value '{raw}'"))?;
    if !value.is_finite() {
        return Err(format!("non-finite '{name}' value '{raw}'"));
    }
    Ok(value)
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    // ISO dates are the norm, but spreadsheet exports often use `DD/MM/YYYY`
    // or `DD-MM-YYYY`. We accept a small set of common formats.
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    Err(format!("invalid date '{raw}'"))
}
