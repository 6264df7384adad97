//! Tripod BSM evaluation.
//!
//! Models are implemented as small, pure functions so that fitting/search code
//! can stay generic.

pub mod model;
pub mod surface;

pub use model::*;
pub use surface::*;
