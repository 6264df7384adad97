//! Plain-text formatting for terminal output.
//!
//! Formatting lives here so the math/fitting code stays clean and output
//! changes are localized.

use crate::domain::{PointResidual, TripodBsm, TRIPOD_BSM_NAMES, TRIPOD_BSM_NVARYING};
use crate::fit::{FitOutcome, RescaleOutcome, StopReason};

/// Format a model as a `name value` table.
pub fn format_model(model: &TripodBsm) -> String {
    let mut out = String::new();
    for (i, (name, value)) in TRIPOD_BSM_NAMES.iter().zip(model.to_array()).enumerate() {
        let tag = if i < TRIPOD_BSM_NVARYING { "fit" } else { "" };
        out.push_str(format!("  {name:<4} {value:>18.10} {tag}").trim_end());
        out.push('\n');
    }
    out
}

/// Format the summary of a successful fit or rescale.
///
/// `report` adds standard errors when the linear rescaler produced the outcome.
pub fn format_fit_summary(outcome: &FitOutcome, report: Option<&RescaleOutcome>) -> String {
    let mut out = String::new();

    out.push_str("=== lcfit - tripod BSM fit ===\n");
    out.push_str(&format!("Method: {}\n", outcome.method.display_name()));
    out.push_str(&format!(
        "Points: n={} | SSE={:.6e} | RMSE={:.6e}\n",
        outcome.quality.n, outcome.quality.sse, outcome.quality.rmse
    ));
    if outcome.stop != StopReason::Direct {
        out.push_str(&format!(
            "Converged: {} after {} iteration(s)\n",
            stop_label(outcome.stop),
            outcome.iterations
        ));
    }

    out.push_str("\nModel:\n");
    out.push_str(&format_model(&outcome.model));

    if let Some(report) = report {
        out.push_str(&format!("\nStandard errors (rank {}):\n", report.rank));
        for (name, se) in TRIPOD_BSM_NAMES.iter().zip(report.std_errors()) {
            out.push_str(&format!("  {name:<4} {se:>18.10}\n"));
        }
    }
    out
}

/// Format the worst-fitting points as a table.
pub fn format_residual_table(rows: &[PointResidual]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>12} {:>12} {:>16} {:>16} {:>12}",
            "distal", "pendant", "log_like", "fitted", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<12} {:-<12} {:-<16} {:-<16} {:-<12}\n",
        "", "", "", "", ""
    ));
    for r in rows {
        let p = &r.point;
        out.push_str(&format!(
            "{:>12.6} {:>12.6} {:>16.6} {:>16.6} {:>12.6}\n",
            p.distal, p.pendant, p.log_like, r.fitted, r.residual
        ));
    }
    out
}

/// Format a single evaluation, optionally with the Jacobian row.
pub fn format_evaluation(distal: f64, pendant: f64, log_like: f64, jacobian: Option<&[f64]>) -> String {
    let mut out = format!("ll({distal}, {pendant}) = {log_like:.10}\n");
    if let Some(row) = jacobian {
        out.push_str(&format!("d ll / d[n00, n01, n10, n11] = {}\n", fmt_vec(row)));
    }
    out
}

fn stop_label(stop: StopReason) -> &'static str {
    match stop {
        StopReason::Gradient => "gradient",
        StopReason::Step => "step size",
        StopReason::Cost => "cost reduction",
        StopReason::Direct => "direct solve",
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.10}")).collect();
    format!("[{}]", parts.join(", "))
}
