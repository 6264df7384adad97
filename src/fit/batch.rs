//! Fit many independent point sets in parallel.
//!
//! Each job owns its starting model and observations; nothing is shared
//! between jobs, so they fan out over the rayon pool and results come back in
//! job order. One job failing does not affect the others.

use rayon::prelude::*;

use crate::domain::{FitMethod, Observation, TripodBsm};
use crate::error::FitError;
use crate::fit::fitter::{fit_with_options, FitOptions, FitOutcome};
use crate::fit::rescale::rescale_with_report;

/// A single fitting problem: a starting model and its observations.
#[derive(Debug, Clone)]
pub struct FitJob {
    pub model: TripodBsm,
    pub points: Vec<Observation>,
}

/// Dispatch to the nonlinear fitter or the linear rescaler.
///
/// `opts` only applies to [`FitMethod::Nonlinear`].
pub fn fit_by_method(
    model: &TripodBsm,
    points: &[Observation],
    method: FitMethod,
    opts: &FitOptions,
) -> Result<FitOutcome, FitError> {
    match method {
        FitMethod::Nonlinear => fit_with_options(model, points, opts),
        FitMethod::Rescale => rescale_with_report(model, points).map(FitOutcome::from),
    }
}

pub fn fit_batch(
    jobs: &[FitJob],
    method: FitMethod,
    opts: &FitOptions,
) -> Vec<Result<FitOutcome, FitError>> {
    jobs.par_iter()
        .map(|job| fit_by_method(&job.model, &job.points, method, opts))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fit::fitter::StopReason;
    use crate::models::log_likelihood;

    fn job(amplitudes: [f64; 4], start: [f64; 4]) -> FitJob {
        let truth = TripodBsm::new(amplitudes, [1.0, 0.01, 0.6, 1.2, 0.02]);
        let mut points = Vec::new();
        for &c in &[0.0, 0.2, 0.4, 0.6] {
            for &tx in &[0.05, 0.3, 0.9] {
                points.push(Observation::new(c, tx, log_likelihood(&truth, c, tx)));
            }
        }
        FitJob {
            model: truth.with_amplitudes(start),
            points,
        }
    }

    #[test]
    fn results_come_back_in_job_order() {
        let targets = [
            [1500.0, 120.0, 90.0, 40.0],
            [800.0, 60.0, 50.0, 20.0],
            [300.0, 30.0, 25.0, 15.0],
        ];
        let jobs: Vec<FitJob> = targets
            .iter()
            .map(|t| job(*t, [100.0, 10.0, 10.0, 10.0]))
            .collect();

        let results = fit_batch(&jobs, FitMethod::Rescale, &FitOptions::default());
        assert_eq!(results.len(), 3);
        for (res, want) in results.iter().zip(targets.iter()) {
            let out = res.as_ref().unwrap();
            assert_eq!(out.method, FitMethod::Rescale);
            assert_eq!(out.stop, StopReason::Direct);
            assert_eq!(out.iterations, 0);
            for (g, w) in out.model.amplitudes().iter().zip(want.iter()) {
                assert!((g - w).abs() <= 1e-6 * w, "{g} vs {w}");
            }
        }
    }

    #[test]
    fn failing_job_does_not_poison_the_batch() {
        let good = job([1500.0, 120.0, 90.0, 40.0], [1400.0, 110.0, 95.0, 45.0]);
        let mut short = good.clone();
        short.points.truncate(2);

        let results = fit_batch(
            &[good.clone(), short, good],
            FitMethod::Nonlinear,
            &FitOptions::default(),
        );
        assert!(results[0].is_ok());
        assert_eq!(
            results[1].as_ref().unwrap_err().kind(),
            ErrorKind::InsufficientData
        );
        assert!(results[2].is_ok());
        assert_eq!(results[0].as_ref().unwrap().method, FitMethod::Nonlinear);
    }

    #[test]
    fn methods_agree_on_exact_data() {
        let j = job([800.0, 60.0, 50.0, 20.0], [700.0, 70.0, 40.0, 25.0]);
        let opts = FitOptions::default();
        let lm = fit_by_method(&j.model, &j.points, FitMethod::Nonlinear, &opts).unwrap();
        let ols = fit_by_method(&j.model, &j.points, FitMethod::Rescale, &opts).unwrap();
        for (a, b) in lm.model.amplitudes().iter().zip(ols.model.amplitudes().iter()) {
            assert!((a - b).abs() <= 1e-6 * b.abs(), "{a} vs {b}");
        }
    }
}
