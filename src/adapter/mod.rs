//! Raw-value boundary for host runtimes.
//!
//! Hosts that hold models as flat `[f64]` vectors and observations as rows of
//! `[distal, pendant, log_like]` go through here. Everything is converted to
//! [`TripodBsm`] / [`Observation`] and validated before an evaluator runs.

use crate::domain::{Observation, TripodBsm, TRIPOD_BSM_NPARAM, TRIPOD_BSM_NVARYING};
use crate::error::{ErrorKind, FitError};
use crate::fit::{check_point, fit, rescale};
use crate::models::{jacobian, log_likelihood};

/// Values per observation row.
pub const POINT_WIDTH: usize = 3;

pub fn model_from_slice(values: &[f64]) -> Result<TripodBsm, FitError> {
    let arr: [f64; TRIPOD_BSM_NPARAM] = values.try_into().map_err(|_| {
        FitError::new(
            ErrorKind::Dimension,
            format!(
                "Invalid model dimension: {} [expected {TRIPOD_BSM_NPARAM}]",
                values.len()
            ),
        )
    })?;
    Ok(TripodBsm::from_array(arr))
}

pub fn model_to_array(model: &TripodBsm) -> [f64; TRIPOD_BSM_NPARAM] {
    model.to_array()
}

/// Convert `[distal, pendant, log_like]` rows, rejecting the first bad row.
pub fn points_from_rows(rows: &[Vec<f64>]) -> Result<Vec<Observation>, FitError> {
    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let [distal, pendant, log_like] = row.as_slice() else {
            return Err(FitError::new(
                ErrorKind::Dimension,
                format!(
                    "Point {i} has {} values [expected {POINT_WIDTH}]",
                    row.len()
                ),
            ));
        };
        let p = Observation::new(*distal, *pendant, *log_like);
        check_point(i, &p)?;
        out.push(p);
    }
    Ok(out)
}

/// Nonlinear fit on raw inputs; returns the fitted 9-vector.
pub fn fit_raw(model: &[f64], rows: &[Vec<f64>]) -> Result<Vec<f64>, FitError> {
    let m = model_from_slice(model)?;
    let points = points_from_rows(rows)?;
    Ok(fit(&m, &points)?.to_array().to_vec())
}

/// Linear rescale on raw inputs; returns the rescaled 9-vector.
pub fn rescale_raw(model: &[f64], rows: &[Vec<f64>]) -> Result<Vec<f64>, FitError> {
    let m = model_from_slice(model)?;
    let points = points_from_rows(rows)?;
    Ok(rescale(&m, &points)?.to_array().to_vec())
}

pub fn log_likelihood_raw(model: &[f64], distal: f64, pendant: f64) -> Result<f64, FitError> {
    let m = model_from_slice(model)?;
    Ok(log_likelihood(&m, distal, pendant))
}

/// Partial derivatives with respect to `[n00, n01, n10, n11]`.
pub fn jacobian_raw(model: &[f64], distal: f64, pendant: f64) -> Result<Vec<f64>, FitError> {
    let m = model_from_slice(model)?;
    let row: [f64; TRIPOD_BSM_NVARYING] = jacobian(&m, distal, pendant);
    Ok(row.to_vec())
}
