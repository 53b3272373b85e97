//! Command-line reachability scan of a model file.

use anyhow::{Context, Result};
use clap::Parser;
use robot_reach::{ReachModel, ReachScanner, write_solutions, write_success_grid};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "robot-reach", version, about = "Map the reachable workspace of a robot arm")]
struct Args {
    /// TOML model file with `[scan]` and `[chain]` tables
    model: PathBuf,

    /// Where to write joint solutions
    #[arg(long, default_value = "robot_reach_solutions.txt")]
    solutions: PathBuf,

    /// Where to write the success grid
    #[arg(long, default_value = "robot_reach_success.txt")]
    success: PathBuf,

    /// Override the per-axis tolerance (world units)
    #[arg(long)]
    tolerance: Option<f64>,

    /// Override the conversion factor (grid indices per world unit)
    #[arg(long)]
    conversion: Option<u32>,

    /// Override the Z index stride
    #[arg(long)]
    z_stride: Option<usize>,

    /// Number of worker threads
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let mut model = ReachModel::load(&args.model)
        .with_context(|| format!("loading model {}", args.model.display()))?;
    if let Some(tolerance) = args.tolerance {
        model.scan.tolerance = tolerance;
    }
    if let Some(conversion) = args.conversion {
        model.scan.conversion = conversion;
    }
    if let Some(z_stride) = args.z_stride {
        model.scan.stride[2] = z_stride;
    }
    if args.workers.is_some() {
        model.scan.workers = args.workers;
    }

    let scanner = ReachScanner::new(model.scan.clone())?;
    let report = scanner.scan(&model.chain)?;

    log::info!(
        "{} of {} sampled points reachable ({} cells untested)",
        report.reached,
        report.sampled,
        report.map.len() - report.map.tested_count()
    );
    log::info!("Total scan time: {:.2?}", report.elapsed);

    write_success_grid(&report.map, &args.success)?;
    write_solutions(&report.map, &args.solutions)?;

    Ok(())
}
