//! `lcfit-tripod` library crate.
//!
//! Fits the amplitude coefficients of a tripod binary-symmetric model (BSM)
//! to sampled phylogenetic log-likelihoods, by Levenberg–Marquardt or by a
//! single linear rescale.
//!
//! The binary (`lcfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - host runtimes can call the raw-value [`adapter`] directly

pub mod adapter;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
