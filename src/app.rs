//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads model/points files
//! - runs the fitters and evaluators
//! - prints reports
//! - writes optional outputs

use clap::Parser;
use tracing::Level;

use crate::cli::{Command, EvalArgs, FitArgs, RescaleArgs, SimulateArgs, SurfaceArgs};
use crate::domain::{FitConfig, FitMethod, SimulationConfig, SurfaceSpec};
use crate::error::FitError;
use crate::io::{model_file, read_model_json, write_model_json};

pub mod pipeline;

/// Environment variable consulted when `--log-level` is not given.
pub const LOG_ENV: &str = "LCFIT_LOG";

/// Entry point for the `lcfit` binary.
pub fn run() -> Result<(), FitError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Command::Eval(args) => handle_eval(args),
        Command::Fit(args) => handle_fit(fit_config_from_args(&args)),
        Command::Rescale(args) => handle_fit(rescale_config_from_args(&args)),
        Command::Simulate(args) => handle_simulate(args),
        Command::Surface(args) => handle_surface(args),
    }
}

fn init_logging(flag: Option<Level>) {
    let level = flag.unwrap_or_else(|| level_from_env(std::env::var(LOG_ENV).ok().as_deref()));
    // A second init (e.g. in-process tests) keeps the existing subscriber.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn level_from_env(value: Option<&str>) -> Level {
    value
        .and_then(|v| v.trim().parse::<Level>().ok())
        .unwrap_or(Level::WARN)
}

fn handle_eval(args: EvalArgs) -> Result<(), FitError> {
    let file = read_model_json(&args.model)?;
    let ll = crate::models::log_likelihood(&file.model, args.distal, args.pendant);
    let jac = args
        .jacobian
        .then(|| crate::models::jacobian(&file.model, args.distal, args.pendant));

    print!(
        "{}",
        crate::report::format_evaluation(args.distal, args.pendant, ll, jac.as_ref().map(|j| &j[..]))
    );
    Ok(())
}

fn handle_fit(config: FitConfig) -> Result<(), FitError> {
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_fit_summary(&run.outcome, run.rescale.as_ref())
    );
    if !run.worst.is_empty() {
        println!("Worst-fitting points:");
        println!("{}", crate::report::format_residual_table(&run.worst));
    }

    if let Some(path) = &config.out {
        let file = model_file(run.outcome.model, Some(run.outcome.method), Some(run.outcome.quality));
        write_model_json(path, &file)?;
    }
    if let Some(path) = &config.export_residuals {
        crate::io::write_residuals_csv(path, &run.residuals)?;
    }

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), FitError> {
    let file = read_model_json(&args.model)?;
    let sim = SimulationConfig {
        count: args.count,
        seed: args.seed,
        noise_sd: args.noise,
        pendant_max: args.pendant_max,
    };
    let points = crate::data::simulate(&file.model, &sim)?;
    crate::io::write_points_csv(&args.out, &points)?;
    println!("Wrote {} points to {}", points.len(), args.out.display());
    Ok(())
}

fn handle_surface(args: SurfaceArgs) -> Result<(), FitError> {
    let file = read_model_json(&args.model)?;
    let spec = SurfaceSpec {
        steps: args.steps,
        pendant_max: args.pendant_max,
    };
    let grid = crate::models::evaluate_surface(&file.model, &spec)?;
    crate::io::write_surface_csv(&args.out, &grid)?;
    println!(
        "Wrote {}x{} grid to {}",
        grid.distal.len(),
        grid.pendant.len(),
        args.out.display()
    );
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        model_path: args.model.clone(),
        points_path: args.points.clone(),
        method: FitMethod::Nonlinear,
        max_iterations: args.max_iter,
        x_tol: args.x_tol,
        out: args.out.clone(),
        export_residuals: args.export.clone(),
        top_n: args.top,
    }
}

pub fn rescale_config_from_args(args: &RescaleArgs) -> FitConfig {
    let defaults = crate::fit::FitOptions::default();
    FitConfig {
        model_path: args.model.clone(),
        points_path: args.points.clone(),
        method: FitMethod::Rescale,
        max_iterations: defaults.max_iterations,
        x_tol: defaults.x_tol,
        out: args.out.clone(),
        export_residuals: args.export.clone(),
        top_n: args.top,
    }
}
