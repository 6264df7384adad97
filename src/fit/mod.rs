//! Fitting the amplitude coefficients of a tripod model to sampled log-likelihoods.
//!
//! Responsibilities:
//!
//! - validate inputs before any numeric work
//! - nonlinear (Levenberg–Marquardt) refinement of the four amplitudes
//! - closed-form linear rescale of the same four amplitudes
//! - parallel fitting of independent point sets

pub mod batch;
pub mod fitter;
pub mod rescale;
pub mod validate;

pub use batch::*;
pub use fitter::*;
pub use rescale::*;
pub use validate::*;
