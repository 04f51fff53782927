//! Data sources.
//!
//! The real history comes from the upstream collector as a CSV (see
//! `crate::io::history`); this module provides synthetic generation so the
//! tool and its tests can run without it.

pub mod sample;

pub use sample::*;
