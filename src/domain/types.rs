//! Shared domain types.
//!
//! These types are intentionally kept lightweight, `Copy` where possible, and
//! serializable so they can be:
//!
//! - passed by value through the evaluators and fitters
//! - exported to JSON/CSV by the CLI host
//! - reloaded later for evaluation or refits

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Total number of BSM parameters.
pub const TRIPOD_BSM_NPARAM: usize = 9;

/// Number of varying (amplitude) parameters adjusted by the fitters.
pub const TRIPOD_BSM_NVARYING: usize = 4;

/// Number of fixed shape parameters.
pub const TRIPOD_BSM_NSHAPE: usize = TRIPOD_BSM_NPARAM - TRIPOD_BSM_NVARYING;

/// Parameter names in storage order.
pub const TRIPOD_BSM_NAMES: [&str; TRIPOD_BSM_NPARAM] =
    ["n00", "n01", "n10", "n11", "r", "b", "t", "rx", "bx"];

/// Binary symmetric model over a tripod (distal, proximal, pendant branches).
///
/// The first four fields are site-pattern counts; the likelihood is linear in
/// them once the five shape fields are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripodBsm {
    /// Sites where all three leaves agree.
    pub n00: f64,
    /// Sites where the pendant leaf differs from the proximal leaf only.
    pub n01: f64,
    /// Sites where the pendant leaf differs from the distal leaf only.
    pub n10: f64,
    /// Sites where the pendant leaf differs from both.
    pub n11: f64,
    /// Substitution rate along the attachment edge.
    pub r: f64,
    /// Branch length offset on each side of the attachment point.
    pub b: f64,
    /// Total length of the attachment edge.
    pub t: f64,
    /// Substitution rate along the pendant edge.
    pub rx: f64,
    /// Branch length offset on the pendant edge.
    pub bx: f64,
}

impl TripodBsm {
    pub fn new(amplitudes: [f64; TRIPOD_BSM_NVARYING], shape: [f64; TRIPOD_BSM_NSHAPE]) -> Self {
        let [n00, n01, n10, n11] = amplitudes;
        let [r, b, t, rx, bx] = shape;
        Self {
            n00,
            n01,
            n10,
            n11,
            r,
            b,
            t,
            rx,
            bx,
        }
    }

    pub fn from_array(values: [f64; TRIPOD_BSM_NPARAM]) -> Self {
        let [n00, n01, n10, n11, r, b, t, rx, bx] = values;
        Self {
            n00,
            n01,
            n10,
            n11,
            r,
            b,
            t,
            rx,
            bx,
        }
    }

    pub fn to_array(&self) -> [f64; TRIPOD_BSM_NPARAM] {
        [
            self.n00, self.n01, self.n10, self.n11, self.r, self.b, self.t, self.rx, self.bx,
        ]
    }

    /// The varying parameters `[n00, n01, n10, n11]`.
    pub fn amplitudes(&self) -> [f64; TRIPOD_BSM_NVARYING] {
        [self.n00, self.n01, self.n10, self.n11]
    }

    /// The fixed shape parameters `[r, b, t, rx, bx]`.
    pub fn shape(&self) -> [f64; TRIPOD_BSM_NSHAPE] {
        [self.r, self.b, self.t, self.rx, self.bx]
    }

    /// A copy of this model with the amplitudes replaced and shape kept as-is.
    pub fn with_amplitudes(&self, amplitudes: [f64; TRIPOD_BSM_NVARYING]) -> Self {
        Self::new(amplitudes, self.shape())
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// A sampled point on the likelihood surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Distal branch length of the attachment location.
    pub distal: f64,
    /// Pendant branch length.
    pub pendant: f64,
    /// Observed log-likelihood.
    pub log_like: f64,
}

impl Observation {
    pub fn new(distal: f64, pendant: f64, log_like: f64) -> Self {
        Self {
            distal,
            pendant,
            log_like,
        }
    }
}

/// Which fitter to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMethod {
    /// Levenberg–Marquardt over the four varying parameters.
    Nonlinear,
    /// Single linear least-squares solve for the amplitudes.
    Rescale,
}

impl FitMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            FitMethod::Nonlinear => "nonlinear (LM)",
            FitMethod::Rescale => "linear rescale",
        }
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Per-observation fitted value and residual (`observed - fitted`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointResidual {
    pub point: Observation,
    pub fitted: f64,
    pub residual: f64,
}

/// Grid layout for surface evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSpec {
    /// Nodes per axis (>= 2).
    pub steps: usize,
    /// Upper bound of the pendant axis; the distal axis spans `[0, t]`.
    pub pendant_max: f64,
}

/// Model log-likelihood on a regular `distal × pendant` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    pub distal: Vec<f64>,
    pub pendant: Vec<f64>,
    /// Row-major: `log_like[i][j]` is at `(distal[i], pendant[j])`.
    pub log_like: Vec<Vec<f64>>,
}

/// Settings for drawing synthetic observations from a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub count: usize,
    pub seed: u64,
    /// Standard deviation of additive Gaussian noise on `log_like`.
    pub noise_sd: f64,
    pub pendant_max: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            count: 20,
            seed: 42,
            noise_sd: 0.0,
            pendant_max: 1.0,
        }
    }
}

/// A saved model file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(default)]
    pub tool: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<FitMethod>,
    pub model: TripodBsm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_quality: Option<FitQuality>,
}

/// A full fit run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub model_path: PathBuf,
    pub points_path: PathBuf,
    pub method: FitMethod,

    pub max_iterations: usize,
    pub x_tol: f64,

    pub out: Option<PathBuf>,
    pub export_residuals: Option<PathBuf>,
    /// Number of worst-fitting points to print.
    pub top_n: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_layout_puts_amplitudes_first() {
        let m = TripodBsm::new([1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(m.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(TripodBsm::from_array(m.to_array()), m);
        assert_eq!(m.amplitudes(), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m.shape(), [5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn with_amplitudes_keeps_shape() {
        let m = TripodBsm::new([1.0, 2.0, 3.0, 4.0], [0.5, 0.1, 0.3, 1.2, 0.05]);
        let m2 = m.with_amplitudes([10.0, 20.0, 30.0, 40.0]);
        assert_eq!(m2.shape(), m.shape());
        assert_eq!(m2.n11, 40.0);
        // `m` itself is unchanged.
        assert_eq!(m.n11, 4.0);
    }
}
