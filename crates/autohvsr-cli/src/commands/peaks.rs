//! Candidate peak listing command.

use autohvsr_core::io;
use autohvsr_core::pipeline::compute_features;
use clap::Args;
use std::path::PathBuf;

use super::common::load_settings;

#[derive(Args)]
pub struct PeaksArgs {
    /// Curve set (.json or text table)
    #[arg(value_name = "CURVES")]
    curves: PathBuf,

    /// Minimum peak prominence; defaults to the settings value
    #[arg(long)]
    min_prominence: Option<f64>,

    /// Settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write peaks and all feature columns as CSV
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: PeaksArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    let mut config = settings.pipeline;
    if let Some(p) = args.min_prominence {
        anyhow::ensure!(p.is_finite() && p >= 0.0, "--min-prominence must be non-negative");
        config.peaks.min_prominence = p;
    }

    let curves = io::read_curve_set(&args.curves)?;
    let (candidates, features) = compute_features(&curves, &config)?;

    println!(
        "{} candidate peaks in {} windows (min prominence {})",
        candidates.len(),
        curves.n_windows(),
        config.peaks.min_prominence
    );
    println!("  {:>6}  {:>10}  {:>9}  {:>10}", "window", "freq (Hz)", "amplitude", "prominence");
    for c in &candidates {
        println!(
            "  {:>6}  {:>10.3}  {:>9.3}  {:>10.3}",
            c.window_index, c.frequency, c.amplitude, c.prominence
        );
    }

    if let Some(path) = &args.output {
        io::write_candidate_csv(&candidates, &features, path)?;
        println!("\nWrote {} rows to {}", candidates.len(), path.display());
    }

    Ok(())
}
