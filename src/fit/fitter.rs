//! Nonlinear least-squares refinement of the four varying parameters.
//!
//! Given a starting model and observations `(c_i, tx_i, ll_i)`, we minimize
//!
//! ```text
//! SSE(x) = Σ (ll(x; c_i, tx_i) - ll_i)^2
//! ```
//!
//! over the amplitudes `x = [n00, n01, n10, n11]` with a Levenberg–Marquardt
//! iteration, keeping the five shape parameters fixed. Each iteration:
//!
//! - evaluates the analytic Jacobian `J` (n×4) and residuals `r`
//! - rejects a rank-deficient `J` outright (damping would hide it)
//! - solves `(JᵀJ + λ diag(JᵀJ)) δ = -Jᵀr` by Cholesky
//! - accepts the step if SSE does not increase, otherwise raises `λ`
//!
//! The caller's model is only read; a new model is built on success.

use nalgebra::{DMatrix, DVector, Vector4};
use tracing::{debug, info, warn};

use crate::domain::{FitMethod, FitQuality, Observation, TripodBsm, TRIPOD_BSM_NVARYING};
use crate::error::{ErrorKind, FitError};
use crate::fit::validate::{check_model, check_points};
use crate::math::matrix_rank;
use crate::models::{jacobian, log_likelihood};

/// Solver settings for [`fit_with_options`].
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Maximum number of Jacobian evaluations.
    pub max_iterations: usize,
    /// Step tolerance: converged when `|δ_k| <= x_tol * (|x_k| + x_tol)` for all `k`.
    pub x_tol: f64,
    /// Gradient tolerance on `max_k |(Jᵀr)_k|`.
    pub g_tol: f64,
    /// Relative SSE reduction below which an accepted step counts as converged.
    pub f_tol: f64,
    /// Initial damping parameter.
    pub initial_lambda: f64,
    /// Factor to increase lambda on a rejected step.
    pub lambda_up: f64,
    /// Factor to decrease lambda on an accepted step.
    pub lambda_down: f64,
    /// Damping above which the solve is abandoned.
    pub lambda_max: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            x_tol: 1e-10,
            g_tol: 1e-12,
            f_tol: 1e-14,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            lambda_max: 1e12,
        }
    }
}

impl FitOptions {
    pub fn validate(&self) -> Result<(), FitError> {
        if self.max_iterations == 0 {
            return Err(FitError::new(ErrorKind::Config, "max_iterations must be >= 1."));
        }
        let positive = [
            ("x_tol", self.x_tol),
            ("g_tol", self.g_tol),
            ("f_tol", self.f_tol),
            ("initial_lambda", self.initial_lambda),
            ("lambda_max", self.lambda_max),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FitError::new(
                    ErrorKind::Config,
                    format!("Invalid {name}: {value} (must be finite and > 0)."),
                ));
            }
        }
        if !(self.lambda_up.is_finite() && self.lambda_up > 1.0) {
            return Err(FitError::new(
                ErrorKind::Config,
                format!("Invalid lambda_up: {} (must be > 1).", self.lambda_up),
            ));
        }
        if !(self.lambda_down.is_finite() && self.lambda_down > 0.0 && self.lambda_down < 1.0) {
            return Err(FitError::new(
                ErrorKind::Config,
                format!("Invalid lambda_down: {} (must be in (0, 1)).", self.lambda_down),
            ));
        }
        if self.initial_lambda > self.lambda_max {
            return Err(FitError::new(
                ErrorKind::Config,
                "initial_lambda must not exceed lambda_max.",
            ));
        }
        Ok(())
    }
}

/// Why a successful fit stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Gradient below `g_tol`.
    Gradient,
    /// Step below `x_tol`.
    Step,
    /// Relative SSE reduction below `f_tol`.
    Cost,
    /// Closed-form solve (linear rescale).
    Direct,
}

/// Fitted model plus diagnostics.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub model: TripodBsm,
    pub method: FitMethod,
    pub quality: FitQuality,
    pub iterations: usize,
    pub stop: StopReason,
}

/// Refine the varying parameters of `model` against `points` with default options.
pub fn fit(model: &TripodBsm, points: &[Observation]) -> Result<TripodBsm, FitError> {
    Ok(fit_with_options(model, points, &FitOptions::default())?.model)
}

/// Refine the varying parameters of `model` against `points`.
pub fn fit_with_options(
    model: &TripodBsm,
    points: &[Observation],
    opts: &FitOptions,
) -> Result<FitOutcome, FitError> {
    opts.validate()?;
    check_points(points)?;
    check_model(model)?;

    let n = points.len();
    let mut x = Vector4::from(model.amplitudes());

    let mut jac = DMatrix::<f64>::zeros(n, TRIPOD_BSM_NVARYING);
    let mut resid = DVector::<f64>::zeros(n);
    let mut trial_resid = DVector::<f64>::zeros(n);

    let mut sse = fill_residuals(&model.with_amplitudes(x.into()), points, &mut resid);
    if !sse.is_finite() {
        warn!("non-finite residuals at the starting model");
        return Err(FitError::new(
            ErrorKind::BadFunction,
            "Model log-likelihood is not finite at the starting guess",
        ));
    }

    let mut lambda = opts.initial_lambda;

    for iter in 0..opts.max_iterations {
        let current = model.with_amplitudes(x.into());
        fill_jacobian(&current, points, &mut jac);
        if jac.iter().any(|v| !v.is_finite()) {
            warn!(iter, "non-finite Jacobian");
            return Err(FitError::new(
                ErrorKind::BadFunction,
                format!("Jacobian is not finite at iteration {iter}"),
            ));
        }

        let rank = matrix_rank(&jac);
        if rank < TRIPOD_BSM_NVARYING {
            warn!(iter, rank, "rank-deficient Jacobian");
            return Err(FitError::new(
                ErrorKind::Singular,
                format!("Jacobian is rank-deficient: rank {rank} < {TRIPOD_BSM_NVARYING}"),
            ));
        }

        let jtj = jac.tr_mul(&jac);
        let grad = jac.tr_mul(&resid);
        let grad_inf = grad.amax();
        if grad_inf <= opts.g_tol {
            return Ok(finish(model, x, sse, n, iter, StopReason::Gradient));
        }

        // Inner loop: raise lambda until a step is accepted.
        loop {
            let mut damped = jtj.clone();
            for i in 0..TRIPOD_BSM_NVARYING {
                damped[(i, i)] += lambda * jtj[(i, i)];
            }
            let chol = damped.cholesky().ok_or_else(|| {
                warn!(iter, lambda, "damped normal equations not positive definite");
                FitError::new(
                    ErrorKind::Singular,
                    format!("Damped normal equations are not positive definite (lambda={lambda:e})"),
                )
            })?;
            let delta = -chol.solve(&grad);
            let step = Vector4::new(delta[0], delta[1], delta[2], delta[3]);
            let x_trial = x + step;

            let trial_sse =
                fill_residuals(&model.with_amplitudes(x_trial.into()), points, &mut trial_resid);

            if trial_sse.is_finite() && trial_sse <= sse {
                let reduction = sse - trial_sse;
                debug!(iter, sse = trial_sse, lambda, "accepted step");

                let prev_sse = sse;
                x = x_trial;
                sse = trial_sse;
                std::mem::swap(&mut resid, &mut trial_resid);
                lambda = (lambda * opts.lambda_down).max(f64::MIN_POSITIVE);

                if step_converged(&step, &x, opts.x_tol) {
                    return Ok(finish(model, x, sse, n, iter + 1, StopReason::Step));
                }
                if reduction <= opts.f_tol * prev_sse {
                    return Ok(finish(model, x, sse, n, iter + 1, StopReason::Cost));
                }
                break;
            }

            debug!(iter, trial_sse, lambda, "rejected step");
            // A rejected step that is already negligible means we are at the
            // rounding floor of the objective.
            if step_converged(&step, &x, opts.x_tol) {
                return Ok(finish(model, x, sse, n, iter + 1, StopReason::Step));
            }

            lambda = raise_damping(lambda, sse, opts).inspect_err(|_| {
                warn!(iter, lambda, "damping overflow");
            })?;
        }
    }

    warn!(max_iterations = opts.max_iterations, sse, "fit did not converge");
    Err(FitError::new(
        ErrorKind::MaxIterations,
        format!(
            "Exceeded max number of iterations ({}) without convergence (sse={sse:e})",
            opts.max_iterations
        ),
    ))
}

/// Increase the damping after a rejected step, failing once it exceeds `lambda_max`.
///
/// The model is linear in the amplitudes, so a damped step is a descent step
/// in exact arithmetic. Rejections only come from rounding or a non-finite
/// trial, which makes this a guard rather than a routine exit.
fn raise_damping(lambda: f64, sse: f64, opts: &FitOptions) -> Result<f64, FitError> {
    let raised = lambda * opts.lambda_up;
    if raised > opts.lambda_max {
        return Err(FitError::new(
            ErrorKind::NoProgress,
            format!(
                "Iteration is not making progress towards solution (lambda={raised:e}, sse={sse:e})"
            ),
        ));
    }
    Ok(raised)
}

/// Residuals `predicted - observed`; returns their sum of squares.
fn fill_residuals(model: &TripodBsm, points: &[Observation], out: &mut DVector<f64>) -> f64 {
    let mut sse = 0.0;
    for (i, p) in points.iter().enumerate() {
        let r = log_likelihood(model, p.distal, p.pendant) - p.log_like;
        out[i] = r;
        sse += r * r;
    }
    sse
}

fn fill_jacobian(model: &TripodBsm, points: &[Observation], out: &mut DMatrix<f64>) {
    for (i, p) in points.iter().enumerate() {
        let row = jacobian(model, p.distal, p.pendant);
        for (j, v) in row.iter().enumerate() {
            out[(i, j)] = *v;
        }
    }
}

fn step_converged(step: &Vector4<f64>, x: &Vector4<f64>, x_tol: f64) -> bool {
    step.iter()
        .zip(x.iter())
        .all(|(d, xi)| d.abs() <= x_tol * (xi.abs() + x_tol))
}

pub(crate) fn quality_from_sse(sse: f64, n: usize) -> FitQuality {
    FitQuality {
        sse,
        rmse: (sse / n as f64).sqrt(),
        n,
    }
}

fn finish(
    model: &TripodBsm,
    x: Vector4<f64>,
    sse: f64,
    n: usize,
    iterations: usize,
    stop: StopReason,
) -> FitOutcome {
    let fitted = model.with_amplitudes(x.into());
    info!(iterations, sse, ?stop, "nonlinear fit converged");
    FitOutcome {
        model: fitted,
        method: FitMethod::Nonlinear,
        quality: quality_from_sse(sse, n),
        iterations,
        stop,
    }
}
