//! Input/output helpers.
//!
//! - history CSV ingest + validation (`history`)
//! - forecast/history CSV exports (`export`)

pub mod export;
pub mod history;

pub use export::*;
pub use history::*;
