//! Input guards shared by both fitters.
//!
//! These run before any matrix is allocated, so a rejected call does no
//! numeric work at all.

use crate::domain::{Observation, TripodBsm, TRIPOD_BSM_NAMES, TRIPOD_BSM_NVARYING};
use crate::error::{ErrorKind, FitError};

/// Require at least as many observations as varying parameters.
pub fn check_point_count(points: &[Observation]) -> Result<(), FitError> {
    if points.len() < TRIPOD_BSM_NVARYING {
        return Err(FitError::new(
            ErrorKind::InsufficientData,
            format!(
                "Insufficient points to fit ({}) [need at least {TRIPOD_BSM_NVARYING}]",
                points.len()
            ),
        ));
    }
    Ok(())
}

/// Validate a single observation: finite values, non-negative branch lengths.
pub fn check_point(index: usize, p: &Observation) -> Result<(), FitError> {
    if !(p.distal.is_finite() && p.pendant.is_finite() && p.log_like.is_finite()) {
        return Err(FitError::new(
            ErrorKind::Format,
            format!(
                "Point {index} has a non-finite value: ({}, {}, {})",
                p.distal, p.pendant, p.log_like
            ),
        ));
    }
    if p.distal < 0.0 || p.pendant < 0.0 {
        return Err(FitError::new(
            ErrorKind::Format,
            format!(
                "Point {index} has a negative branch length: distal={}, pendant={}",
                p.distal, p.pendant
            ),
        ));
    }
    Ok(())
}

/// Count first, then contents.
pub fn check_points(points: &[Observation]) -> Result<(), FitError> {
    check_point_count(points)?;
    for (i, p) in points.iter().enumerate() {
        check_point(i, p)?;
    }
    Ok(())
}

pub fn check_model(model: &TripodBsm) -> Result<(), FitError> {
    for (name, value) in TRIPOD_BSM_NAMES.iter().zip(model.to_array()) {
        if !value.is_finite() {
            return Err(FitError::new(
                ErrorKind::Format,
                format!("Model parameter `{name}` is not finite ({value})"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(n: usize) -> Vec<Observation> {
        (0..n)
            .map(|i| Observation::new(0.1 * i as f64, 0.2, -100.0))
            .collect()
    }

    #[test]
    fn three_points_are_insufficient() {
        let err = check_points(&pts(3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
        assert!(check_points(&pts(4)).is_ok());
    }

    #[test]
    fn count_is_checked_before_contents() {
        let bad = vec![Observation::new(f64::NAN, 0.0, 0.0)];
        assert_eq!(check_points(&bad).unwrap_err().kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn negative_or_non_finite_values_are_format_errors() {
        let mut p = pts(5);
        p[2].pendant = -0.1;
        let err = check_points(&p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.message().contains("Point 2"), "{err}");

        let mut p = pts(5);
        p[4].log_like = f64::INFINITY;
        assert_eq!(check_points(&p).unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn non_finite_model_parameter_is_named() {
        let m = TripodBsm::new([1.0, 1.0, 1.0, 1.0], [1.0, f64::NAN, 0.5, 1.0, 0.0]);
        let err = check_model(&m).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.message().contains("`b`"), "{err}");
    }
}
