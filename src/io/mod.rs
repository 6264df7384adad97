//! Input/output helpers for the CLI host.
//!
//! - observation CSV ingest + validation (`ingest`)
//! - residual / points / surface CSV exports (`export`)
//! - model JSON read/write (`model`)

pub mod export;
pub mod ingest;
pub mod model;

pub use export::*;
pub use ingest::*;
pub use model::*;
