//! Domain types used throughout the engine and the CLI host.
//!
//! This module defines:
//!
//! - the tripod model (`TripodBsm`) and its parameter layout constants
//! - observation points (`Observation`) and fit diagnostics (`FitQuality`)
//! - CLI-facing configuration and file schemas (`FitConfig`, `ModelFile`)

pub mod types;

pub use types::*;
