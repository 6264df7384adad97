//! Likelihood, Jacobian, and coefficient basis of the tripod BSM.
//!
//! The fitters rely on three primitive operations:
//! - build a design row (coefficient basis) for a given `(c, tx)` and shape (for OLS)
//! - predict `ll(c, tx)` for a full model (for residuals)
//! - the partial derivatives of `ll` w.r.t. the four varying parameters (for LM)
//!
//! All three share one kernel: the site-pattern probabilities at `(c, tx)`.
//! The likelihood is `Σ n_k ln P_k`, so it is linear in the amplitudes and the
//! basis row is `ln P_k`.

use crate::domain::{TripodBsm, TRIPOD_BSM_NVARYING};
use crate::math::{pattern_probabilities, transition};

/// Site-pattern probabilities `[P00, P01, P10, P11]` at distal length `c` and
/// pendant length `tx`.
pub fn pattern_probs_at(model: &TripodBsm, c: f64, tx: f64) -> [f64; TRIPOD_BSM_NVARYING] {
    let distal = transition(model.r, c + model.b);
    let proximal = transition(model.r, (model.t - c).max(0.0) + model.b);
    let pendant = transition(model.rx, tx + model.bx);
    pattern_probabilities(distal, proximal, pendant)
}

/// Value of each linear basis function at `(c, tx)` for the model's shape.
///
/// `log_likelihood(m, c, tx) == Σ m.amplitudes()[k] * coefficient_basis(m, c, tx)[k]`
/// wherever every `P_k > 0`. A vanishing probability gives `ln 0 = -inf` here,
/// so the dot product becomes NaN (`0 · -inf`) while [`log_likelihood`] skips
/// zero-count terms and stays finite.
pub fn coefficient_basis(model: &TripodBsm, c: f64, tx: f64) -> [f64; TRIPOD_BSM_NVARYING] {
    pattern_probs_at(model, c, tx).map(f64::ln)
}

/// Fill a design row for the linear rescale.
///
/// # Panics
/// Panics if `out` does not have length 4.
pub fn fill_design_row(model: &TripodBsm, c: f64, tx: f64, out: &mut [f64]) {
    out.copy_from_slice(&coefficient_basis(model, c, tx));
}

/// Predicted log-likelihood at distal length `c` and pendant length `tx`.
pub fn log_likelihood(model: &TripodBsm, c: f64, tx: f64) -> f64 {
    let basis = coefficient_basis(model, c, tx);
    model
        .amplitudes()
        .iter()
        .zip(basis.iter())
        // A pattern with zero count contributes nothing, even where P_k = 0.
        .filter(|(n, _)| **n != 0.0)
        .map(|(&n, &g)| n * g)
        .sum()
}

/// Partial derivatives of [`log_likelihood`] w.r.t. `[n00, n01, n10, n11]`.
///
/// `∂/∂n_k (Σ_j n_j ln P_j) = ln P_k`, since the probabilities depend only on
/// the shape parameters.
pub fn jacobian(model: &TripodBsm, c: f64, tx: f64) -> [f64; TRIPOD_BSM_NVARYING] {
    let probs = pattern_probs_at(model, c, tx);
    let mut out = [0.0; TRIPOD_BSM_NVARYING];
    for (d, p) in out.iter_mut().zip(probs.iter()) {
        *d = p.ln();
    }
    out
}
