//! Linear least-squares rescale of the amplitude coefficients.
//!
//! With the shape parameters fixed the model is linear in `[n00, n01, n10, n11]`:
//!
//! ```text
//! ll(c, tx) = Σ_k n_k · basis_k(c, tx; shape)
//! ```
//!
//! so the best amplitudes for a point set come from a single OLS solve on the
//! `n×4` design matrix of basis rows. No iteration, and the shape parameters
//! of the returned model are bit-identical to the input's.

use nalgebra::{DMatrix, DVector, Matrix4};
use tracing::{info, warn};

use crate::domain::{FitMethod, FitQuality, Observation, TripodBsm, TRIPOD_BSM_NVARYING};
use crate::error::FitError;
use crate::fit::fitter::{quality_from_sse, FitOutcome, StopReason};
use crate::fit::validate::{check_model, check_points};
use crate::math::solve_least_squares;
use crate::models::fill_design_row;

/// Rescaled model plus the regression diagnostics.
#[derive(Debug, Clone)]
pub struct RescaleOutcome {
    pub model: TripodBsm,
    /// `σ² (AᵀA)⁻¹` for the four amplitudes.
    pub covariance: Matrix4<f64>,
    /// Residual sum of squares.
    pub chisq: f64,
    pub quality: FitQuality,
    pub rank: usize,
}

impl RescaleOutcome {
    /// Standard errors of the amplitudes (square roots of the covariance diagonal).
    pub fn std_errors(&self) -> [f64; TRIPOD_BSM_NVARYING] {
        let mut out = [0.0; TRIPOD_BSM_NVARYING];
        for (i, v) in out.iter_mut().enumerate() {
            *v = self.covariance[(i, i)].max(0.0).sqrt();
        }
        out
    }
}

impl From<RescaleOutcome> for FitOutcome {
    fn from(value: RescaleOutcome) -> Self {
        FitOutcome {
            model: value.model,
            method: FitMethod::Rescale,
            quality: value.quality,
            iterations: 0,
            stop: StopReason::Direct,
        }
    }
}

/// Re-estimate the amplitudes of `model` against `points`, keeping its shape.
pub fn rescale(model: &TripodBsm, points: &[Observation]) -> Result<TripodBsm, FitError> {
    Ok(rescale_with_report(model, points)?.model)
}

/// Like [`rescale`], but keep the covariance and fit diagnostics.
pub fn rescale_with_report(
    model: &TripodBsm,
    points: &[Observation],
) -> Result<RescaleOutcome, FitError> {
    check_points(points)?;
    check_model(model)?;

    let n = points.len();
    let mut a = DMatrix::<f64>::zeros(n, TRIPOD_BSM_NVARYING);
    let mut y = DVector::<f64>::zeros(n);
    let mut row = [0.0; TRIPOD_BSM_NVARYING];

    for (i, p) in points.iter().enumerate() {
        fill_design_row(model, p.distal, p.pendant, &mut row);
        for (j, v) in row.iter().enumerate() {
            a[(i, j)] = *v;
        }
        y[i] = p.log_like;
    }

    let ls = solve_least_squares(&a, &y).map_err(|e| {
        warn!(status = e.status(), "linear rescale failed: {e}");
        e
    })?;

    let amplitudes = [
        ls.coefficients[0],
        ls.coefficients[1],
        ls.coefficients[2],
        ls.coefficients[3],
    ];
    let covariance = Matrix4::from_fn(|i, j| ls.covariance[(i, j)]);

    info!(n, chisq = ls.chisq, "linear rescale solved");
    Ok(RescaleOutcome {
        model: model.with_amplitudes(amplitudes),
        covariance,
        chisq: ls.chisq,
        quality: quality_from_sse(ls.chisq, n),
        rank: ls.rank,
    })
}
