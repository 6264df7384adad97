//! Shared "fit pipeline" logic used by the `fit` and `rescale` subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load model -> load points -> fit/rescale -> residuals -> worst points
//!
//! The CLI handlers can then focus on presentation and exports.

use tracing::info;

use crate::domain::{FitConfig, FitMethod, Observation, PointResidual, TripodBsm};
use crate::error::FitError;
use crate::fit::{fit_by_method, rescale_with_report, FitOptions, FitOutcome, RescaleOutcome};
use crate::io::{load_points, read_model_json};
use crate::report::{residuals, worst_residuals};

/// All computed outputs of a single fit run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub outcome: FitOutcome,
    /// Covariance and standard errors, when the linear rescaler ran.
    pub rescale: Option<RescaleOutcome>,
    pub residuals: Vec<PointResidual>,
    pub worst: Vec<PointResidual>,
}

pub fn fit_options_from_config(config: &FitConfig) -> FitOptions {
    FitOptions {
        max_iterations: config.max_iterations,
        x_tol: config.x_tol,
        ..FitOptions::default()
    }
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, FitError> {
    let start = read_model_json(&config.model_path)?;
    let points = load_points(&config.points_path)?;
    info!(
        points = points.len(),
        path = %config.points_path.display(),
        "observations loaded"
    );

    run_fit_with_inputs(config, &start.model, &points)
}

/// Execute the pipeline on already-loaded inputs.
pub fn run_fit_with_inputs(
    config: &FitConfig,
    start: &TripodBsm,
    points: &[Observation],
) -> Result<RunOutput, FitError> {
    let (outcome, rescale) = match config.method {
        FitMethod::Rescale => {
            let report = rescale_with_report(start, points)?;
            (FitOutcome::from(report.clone()), Some(report))
        }
        FitMethod::Nonlinear => {
            let opts = fit_options_from_config(config);
            (fit_by_method(start, points, config.method, &opts)?, None)
        }
    };

    let residuals = residuals(&outcome.model, points);
    let worst = worst_residuals(&residuals, config.top_n);

    Ok(RunOutput {
        outcome,
        rescale,
        residuals,
        worst,
    })
}
