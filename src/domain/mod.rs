//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - daily market observations (`Observation`) and their feature layout
//! - forecast outputs (`Forecast`, `ForecastPoint`)
//! - dataset summary statistics (`DatasetStats`)
//! - run configuration (`ForecastConfig`)

pub mod types;

pub use types::*;
