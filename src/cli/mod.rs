//! Command-line parsing for the `lcfit` tripod likelihood fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lcfit", version, about = "Tripod BSM log-likelihood curve fitter")]
pub struct Cli {
    /// Log verbosity (trace, debug, info, warn, error). Falls back to `LCFIT_LOG`, then `warn`.
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate the model log-likelihood (and optionally its Jacobian) at one point.
    Eval(EvalArgs),
    /// Refine the four amplitudes by nonlinear least squares.
    Fit(FitArgs),
    /// Re-estimate the four amplitudes with a single linear least-squares solve.
    Rescale(RescaleArgs),
    /// Draw synthetic observations from a model.
    Simulate(SimulateArgs),
    /// Evaluate the model over a regular distal × pendant grid.
    Surface(SurfaceArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct EvalArgs {
    /// Model JSON file.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Distal branch length of the attachment point.
    #[arg(long)]
    pub distal: f64,

    /// Pendant branch length.
    #[arg(long)]
    pub pendant: f64,

    /// Also print the partial derivatives with respect to the amplitudes.
    #[arg(long)]
    pub jacobian: bool,
}

/// Options for the nonlinear fit.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Starting model JSON file.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Observations CSV (`distal,pendant,log_like`).
    #[arg(long, value_name = "CSV")]
    pub points: PathBuf,

    /// Maximum number of LM iterations.
    #[arg(long = "max-iter", default_value_t = 500)]
    pub max_iter: usize,

    /// Step tolerance.
    #[arg(long, default_value_t = 1e-10)]
    pub x_tol: f64,

    /// Write the fitted model to JSON.
    #[arg(long, value_name = "JSON")]
    pub out: Option<PathBuf>,

    /// Export per-point residuals to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Show the N worst-fitting points.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct RescaleArgs {
    /// Model JSON file; its shape parameters are kept.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Observations CSV (`distal,pendant,log_like`).
    #[arg(long, value_name = "CSV")]
    pub points: PathBuf,

    /// Write the rescaled model to JSON.
    #[arg(long, value_name = "JSON")]
    pub out: Option<PathBuf>,

    /// Export per-point residuals to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Show the N worst-fitting points.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Generating model JSON file.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Number of observations to draw.
    #[arg(short = 'n', long, default_value_t = 20)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of Gaussian noise added to each log-likelihood.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Upper bound for sampled pendant lengths.
    #[arg(long, default_value_t = 1.0)]
    pub pendant_max: f64,

    /// Output CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct SurfaceArgs {
    /// Model JSON file.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Grid nodes per axis.
    #[arg(long, default_value_t = 25)]
    pub steps: usize,

    /// Upper bound of the pendant axis.
    #[arg(long, default_value_t = 1.0)]
    pub pendant_max: f64,

    /// Output CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}
