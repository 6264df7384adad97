//! CSV exports: per-point residuals, simulated points, and surface grids.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Observation, PointResidual, SurfaceGrid};
use crate::error::{ErrorKind, FitError};

fn create(path: &Path, what: &str) -> Result<File, FitError> {
    File::create(path).map_err(|e| {
        FitError::new(
            ErrorKind::Io,
            format!("Failed to create {what} CSV '{}': {e}", path.display()),
        )
    })
}

fn write_err(what: &str) -> impl Fn(std::io::Error) -> FitError + '_ {
    move |e| FitError::new(ErrorKind::Io, format!("Failed to write {what} CSV: {e}"))
}

/// Write per-point fitted values and residuals.
pub fn write_residuals_csv(path: &Path, residuals: &[PointResidual]) -> Result<(), FitError> {
    let mut file = create(path, "residual")?;
    writeln!(file, "distal,pendant,log_like,fitted,residual").map_err(write_err("residual"))?;
    for r in residuals {
        let p = &r.point;
        writeln!(
            file,
            "{:.10},{:.10},{:.10},{:.10},{:.10}",
            p.distal, p.pendant, p.log_like, r.fitted, r.residual
        )
        .map_err(write_err("residual"))?;
    }
    Ok(())
}

/// Write observations in the format `load_points` reads back.
///
/// Values use Rust's shortest round-trip formatting, so a reload is exact.
pub fn write_points_csv(path: &Path, points: &[Observation]) -> Result<(), FitError> {
    let mut file = create(path, "points")?;
    writeln!(file, "distal,pendant,log_like").map_err(write_err("points"))?;
    for p in points {
        writeln!(file, "{},{},{}", p.distal, p.pendant, p.log_like).map_err(write_err("points"))?;
    }
    Ok(())
}

/// Write a surface grid in long format (one row per node).
pub fn write_surface_csv(path: &Path, grid: &SurfaceGrid) -> Result<(), FitError> {
    let mut file = create(path, "surface")?;
    writeln!(file, "distal,pendant,log_like").map_err(write_err("surface"))?;
    for (c, row) in grid.distal.iter().zip(&grid.log_like) {
        for (tx, ll) in grid.pendant.iter().zip(row) {
            writeln!(file, "{c:.10},{tx:.10},{ll:.10}").map_err(write_err("surface"))?;
        }
    }
    Ok(())
}
