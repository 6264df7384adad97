//! Ordinary least squares via SVD.
//!
//! The linear rescale step solves a small regression problem of the form:
//!
//! ```text
//! minimize Σ (y_i - a_i^T x)^2
//! ```
//!
//! Implementation choices:
//! - SVD handles the tall design matrix directly (more rows than columns).
//!   Nalgebra's `QR::solve` is intended for square systems and panics for
//!   non-square matrices.
//! - Rank is decided with a relative singular-value cutoff. A rank-deficient
//!   system is an error, never a minimum-norm answer.
//! - The covariance is `σ² (AᵀA)⁻¹` with `σ² = χ² / (n - p)`, assembled from the
//!   same decomposition as `V Σ⁻² Vᵀ`.

use nalgebra::{DMatrix, DVector};

use crate::error::{ErrorKind, FitError};

/// Singular values below `RANK_RTOL * σ_max` count as zero.
pub const RANK_RTOL: f64 = 1e-12;

/// Solution of a least-squares problem plus the diagnostics of the solve.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub coefficients: DVector<f64>,
    pub covariance: DMatrix<f64>,
    /// Residual sum of squares at the solution.
    pub chisq: f64,
    pub rank: usize,
}

/// Count singular values above the relative cutoff.
pub fn numerical_rank(singular_values: &DVector<f64>, rtol: f64) -> usize {
    let max = singular_values.iter().copied().fold(0.0_f64, f64::max);
    if !(max.is_finite() && max > 0.0) {
        return 0;
    }
    singular_values.iter().filter(|&&s| s > rtol * max).count()
}

/// Numerical rank of `x` using [`RANK_RTOL`].
pub fn matrix_rank(x: &DMatrix<f64>) -> usize {
    numerical_rank(&x.singular_values(), RANK_RTOL)
}

/// Solve `min ||x·β - y||²` using SVD.
///
/// Fails with [`ErrorKind::Singular`] if `x` does not have full column rank and
/// with [`ErrorKind::BadFunction`] if any input or the solution is non-finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<LeastSquares, FitError> {
    let (n, p) = x.shape();
    if y.len() != n {
        return Err(FitError::new(
            ErrorKind::Dimension,
            format!("Design matrix has {n} rows but observation vector has {}", y.len()),
        ));
    }
    if n < p {
        return Err(FitError::new(
            ErrorKind::InsufficientData,
            format!("Insufficient points to fit ({n})"),
        ));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(FitError::new(
            ErrorKind::BadFunction,
            "Non-finite value in least-squares inputs",
        ));
    }

    let svd = x.clone().svd(true, true);
    let rank = numerical_rank(&svd.singular_values, RANK_RTOL);
    if rank < p {
        return Err(FitError::new(
            ErrorKind::Singular,
            format!("Rank-deficient design matrix: rank {rank} < {p}"),
        ));
    }

    let sv_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let beta = svd
        .solve(y, RANK_RTOL * sv_max)
        .map_err(|e| FitError::new(ErrorKind::Singular, format!("SVD solve failed: {e}")))?;
    if !beta.iter().all(|v| v.is_finite()) {
        return Err(FitError::new(
            ErrorKind::BadFunction,
            "Least-squares solution is not finite",
        ));
    }

    let chisq = (y - x * &beta).norm_squared();

    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| FitError::new(ErrorKind::Singular, "SVD did not produce V^T"))?;
    let mut scaled = v_t.clone();
    for (i, &s) in svd.singular_values.iter().enumerate() {
        scaled.row_mut(i).scale_mut(1.0 / (s * s));
    }
    let xtx_inv = v_t.transpose() * scaled;

    let dof = n - p;
    let sigma2 = if dof > 0 { chisq / dof as f64 } else { 0.0 };

    Ok(LeastSquares {
        coefficients: beta,
        covariance: xtx_inv * sigma2,
        chisq,
        rank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let ls = solve_least_squares(&x, &y).unwrap();
        assert!((ls.coefficients[0] - 2.0).abs() < 1e-10);
        assert!((ls.coefficients[1] - 3.0).abs() < 1e-10);
        assert!(ls.chisq < 1e-20);
        assert_eq!(ls.rank, 2);
    }

    #[test]
    fn covariance_matches_closed_form_for_line_fit() {
        // y = 1 + x with residuals (+1, -2, +1): the fitted line is unchanged and
        // chisq = 6, sigma² = 6 / (3 - 2) = 6.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 0.0, 4.0]);
        let ls = solve_least_squares(&x, &y).unwrap();

        assert!((ls.chisq - 6.0).abs() < 1e-10, "chisq={}", ls.chisq);

        // (XᵀX)⁻¹ for this design is [[5/6, -1/2], [-1/2, 1/2]].
        let expected = [[5.0 / 6.0, -0.5], [-0.5, 0.5]];
        for i in 0..2 {
            for j in 0..2 {
                let want = 6.0 * expected[i][j];
                assert!(
                    (ls.covariance[(i, j)] - want).abs() < 1e-9,
                    "cov[{i},{j}]={} want {want}",
                    ls.covariance[(i, j)]
                );
            }
        }
    }

    #[test]
    fn rank_deficient_system_is_an_error() {
        // Second column is twice the first.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let err = solve_least_squares(&x, &y).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Singular);
    }

    #[test]
    fn non_finite_input_is_an_error() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, f64::NAN]);
        let y = DVector::from_row_slice(&[1.0, 2.0]);
        let err = solve_least_squares(&x, &y).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadFunction);
    }

    #[test]
    fn numerical_rank_handles_zero_matrix() {
        let x = DMatrix::<f64>::zeros(4, 3);
        assert_eq!(matrix_rank(&x), 0);
    }
}
