//! Stable building blocks for binary-symmetric-model site-pattern probabilities.
//!
//! For a branch with rate `r` and effective length `ℓ`, the transition term is
//! `e = exp(-r ℓ)` and its complement `a = 1 - e`. On a three-leaf star the
//! four folded site-pattern probabilities are (times 4):
//!
//! - all agree:          `1 + e_d e_p + e_d e_x + e_p e_x`
//! - one leaf `k` odd:   `2 a_k - a_k a_i - a_k a_j + a_i a_j`
//!
//! Numerical notes:
//! - For short branches `1 - exp(-x)` suffers from catastrophic cancellation.
//!   We use `expm1` for `a`, and the "one leaf odd" forms above are written in
//!   `a` so they stay accurate as all three branches shrink.
//! - Negative effective lengths are clamped to zero.

/// Transition term of a single branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// `exp(-rate * length)`.
    pub e: f64,
    /// `1 - exp(-rate * length)`, computed without cancellation.
    pub a: f64,
}

/// Transition term for a branch of `length` under `rate`.
pub fn transition(rate: f64, length: f64) -> Transition {
    let x = rate * length.max(0.0);
    Transition {
        e: (-x).exp(),
        a: -(-x).exp_m1(),
    }
}

/// Pattern probabilities `[P00, P01, P10, P11]` for the distal (`d`),
/// proximal (`p`) and pendant (`x`) branches.
///
/// Index meaning: first digit is "pendant differs from distal", second digit
/// is "pendant differs from proximal".
pub fn pattern_probabilities(d: Transition, p: Transition, x: Transition) -> [f64; 4] {
    let all_agree = 1.0 + d.e * p.e + d.e * x.e + p.e * x.e;
    let proximal_odd = 2.0 * p.a - p.a * d.a - p.a * x.a + d.a * x.a;
    let distal_odd = 2.0 * d.a - d.a * p.a - d.a * x.a + p.a * x.a;
    let pendant_odd = 2.0 * x.a - x.a * d.a - x.a * p.a + d.a * p.a;
    [
        0.25 * all_agree,
        0.25 * proximal_odd,
        0.25 * distal_odd,
        0.25 * pendant_odd,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_limits() {
        let t0 = transition(1.0, 0.0);
        assert_eq!(t0.e, 1.0);
        assert_eq!(t0.a, 0.0);

        let tiny = transition(1.0, 1e-12);
        assert!((tiny.a - 1e-12).abs() < 1e-24, "a should be ~x for tiny x, got {}", tiny.a);

        let far = transition(2.0, 50.0);
        assert!(far.e < 1e-40);
        assert!((far.a - 1.0).abs() < 1e-15);
    }

    #[test]
    fn negative_length_is_clamped() {
        assert_eq!(transition(1.5, -0.3), transition(1.5, 0.0));
    }

    #[test]
    fn probabilities_sum_to_one() {
        for &(ld, lp, lx) in &[(0.01, 0.2, 0.05), (0.5, 0.5, 0.5), (3.0, 0.001, 7.0), (0.0, 0.0, 0.3)] {
            let probs = pattern_probabilities(
                transition(1.0, ld),
                transition(1.0, lp),
                transition(1.3, lx),
            );
            let total: f64 = probs.iter().sum();
            assert!((total - 1.0).abs() < 1e-14, "sum={total} for ({ld}, {lp}, {lx})");
            assert!(probs.iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn probabilities_saturate_for_long_branches() {
        let probs = pattern_probabilities(
            transition(1.0, 40.0),
            transition(1.0, 40.0),
            transition(1.0, 40.0),
        );
        for p in probs {
            assert!((p - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn short_branch_forms_match_direct_expansion() {
        let (d, p, x) = (transition(0.9, 0.4), transition(0.9, 0.7), transition(1.1, 0.2));
        let direct_distal_odd = 0.25 * (1.0 - d.e * p.e - d.e * x.e + p.e * x.e);
        let probs = pattern_probabilities(d, p, x);
        assert!((probs[2] - direct_distal_odd).abs() < 1e-15);
    }
}
