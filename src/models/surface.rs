//! Evaluate a fitted model over a regular `distal × pendant` grid.

use rayon::prelude::*;

use crate::domain::{SurfaceGrid, SurfaceSpec, TripodBsm};
use crate::error::{ErrorKind, FitError};
use crate::models::log_likelihood;

/// Generate `steps` evenly spaced points in `[min, max]` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Vec<f64> {
    if steps < 2 {
        return vec![min];
    }
    let step = (max - min) / (steps as f64 - 1.0);
    (0..steps).map(|i| min + step * i as f64).collect()
}

/// Evaluate `model` with distal over `[0, t]` and pendant over `[0, pendant_max]`.
///
/// Rows (one per distal value) are evaluated in parallel.
pub fn evaluate_surface(model: &TripodBsm, spec: &SurfaceSpec) -> Result<SurfaceGrid, FitError> {
    if spec.steps < 2 {
        return Err(FitError::new(ErrorKind::Config, "Surface steps must be >= 2."));
    }
    if !(spec.pendant_max.is_finite() && spec.pendant_max > 0.0) {
        return Err(FitError::new(
            ErrorKind::Config,
            format!("Invalid pendant_max: {} (must be finite and > 0).", spec.pendant_max),
        ));
    }
    if !(model.t.is_finite() && model.t > 0.0) {
        return Err(FitError::new(
            ErrorKind::Config,
            format!("Model edge length t={} must be finite and > 0 to span a grid.", model.t),
        ));
    }

    let distal = lin_space(0.0, model.t, spec.steps);
    let pendant = lin_space(0.0, spec.pendant_max, spec.steps);

    let log_like: Vec<Vec<f64>> = distal
        .par_iter()
        .map(|&c| pendant.iter().map(|&tx| log_likelihood(model, c, tx)).collect())
        .collect();

    Ok(SurfaceGrid {
        distal,
        pendant,
        log_like,
    })
}
