//! Window rejection command.

use autohvsr_core::rejection::reject_windows;
use autohvsr_core::{Distribution, io};
use clap::Args;
use std::path::PathBuf;

use super::common::{CliDistribution, CliHvStyle, load_settings, print_fundamental, save_hv};

#[derive(Args)]
pub struct RejectArgs {
    /// Curve set (.json or text table)
    #[arg(value_name = "CURVES")]
    curves: PathBuf,

    /// Acceptance band half-width in standard deviations
    #[arg(long)]
    n: Option<f64>,

    /// Maximum number of rejection passes
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Distribution of the f0 statistics
    #[arg(short, long, value_enum)]
    distribution: Option<CliDistribution>,

    /// Distribution of the mean curve
    #[arg(long, value_enum)]
    distribution_mc: Option<CliDistribution>,

    /// Settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the kept windows as a new curve set
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write an .hv report (mean curve, +/-1 std band, f0 statistics) of the kept windows
    #[arg(long, value_name = "FILE")]
    hv: Option<PathBuf>,

    /// Header layout of the .hv report
    #[arg(long, value_enum, default_value = "hvsrpy")]
    hv_style: CliHvStyle,
}

pub fn run(args: RejectArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    let mut config = settings.rejection.to_config();
    if let Some(n) = args.n {
        anyhow::ensure!(n.is_finite() && n > 0.0, "--n must be positive");
        config.n = n;
    }
    if let Some(max) = args.max_iterations {
        config.max_iterations = max;
    }
    let distribution_f0: Distribution = args
        .distribution
        .map_or(settings.statistics.distribution, Distribution::from);
    let distribution_mc: Distribution = args
        .distribution_mc
        .map_or(settings.pipeline.mean_curve_distribution, Distribution::from);

    let curves = io::read_curve_set(&args.curves)?;
    let outcome = reject_windows(&curves, &config, distribution_f0, distribution_mc)?;

    print_fundamental("Before rejection", &outcome.before);
    println!();
    print_fundamental("After rejection", &outcome.after);
    println!(
        "\nRejected {} of {} windows in {} iterations (n = {})",
        outcome.n_rejected(),
        outcome.accepted.len(),
        outcome.iterations,
        config.n
    );
    let rejected: Vec<String> = outcome
        .accepted
        .iter()
        .enumerate()
        .filter(|(_, kept)| !**kept)
        .map(|(i, _)| i.to_string())
        .collect();
    if !rejected.is_empty() {
        println!("Rejected windows: {}", rejected.join(", "));
    }

    if args.output.is_some() || args.hv.is_some() {
        let kept = curves.select_windows(&outcome.accepted)?;
        if let Some(path) = &args.output {
            io::write_curve_set(&kept, path)?;
            println!("Wrote {} windows to {}", kept.n_windows(), path.display());
        }
        if let Some(path) = &args.hv {
            save_hv(&kept, &outcome.after, distribution_mc, args.hv_style, path)?;
        }
    }

    Ok(())
}
