//! Reporting utilities: residuals, worst-fit rankings, and formatted terminal output.

pub mod format;

use crate::domain::{Observation, PointResidual, TripodBsm};
use crate::models::log_likelihood;

pub use format::*;

/// Fitted value and residual (`observed - fitted`) for each observation.
pub fn residuals(model: &TripodBsm, points: &[Observation]) -> Vec<PointResidual> {
    points
        .iter()
        .map(|p| {
            let fitted = log_likelihood(model, p.distal, p.pendant);
            PointResidual {
                point: *p,
                fitted,
                residual: p.log_like - fitted,
            }
        })
        .collect()
}

/// The `top_n` residuals with the largest magnitude, largest first.
pub fn worst_residuals(residuals: &[PointResidual], top_n: usize) -> Vec<PointResidual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| b.residual.abs().total_cmp(&a.residual.abs()));
    sorted.truncate(top_n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residuals_are_observed_minus_fitted() {
        let m = TripodBsm::new([800.0, 60.0, 50.0, 20.0], [1.0, 0.01, 0.4, 1.0, 0.01]);
        let exact = log_likelihood(&m, 0.1, 0.2);
        let points = [
            Observation::new(0.1, 0.2, exact + 1.5),
            Observation::new(0.1, 0.2, exact),
        ];
        let res = residuals(&m, &points);
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].fitted, exact);
        assert!((res[0].residual - 1.5).abs() < 1e-9);
        assert_eq!(res[1].residual, 0.0);
    }

    #[test]
    fn worst_residuals_rank_by_magnitude() {
        let mk = |r: f64| PointResidual {
            point: Observation::new(0.0, 0.0, r),
            fitted: 0.0,
            residual: r,
        };
        let all = vec![mk(0.1), mk(-3.0), mk(2.0), mk(-0.5)];
        let top = worst_residuals(&all, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].residual, -3.0);
        assert_eq!(top[1].residual, 2.0);
        assert_eq!(worst_residuals(&all, 10).len(), 4);
    }
}
