//! Resonance identification command.

use autohvsr_core::rejection::reject_windows;
use autohvsr_core::{AutoHvsr, Distribution, FundamentalSummary, io};
use clap::Args;
use std::path::PathBuf;

use super::common::{
    CliDistribution, CliHvStyle, classifier_path, load_settings, print_fundamental,
    print_resonances, save_hv,
};

#[derive(Args)]
pub struct IdentifyArgs {
    /// Curve set (.json, or a text table with one column per window)
    #[arg(value_name = "CURVES")]
    curves: PathBuf,

    /// Classifier artifact (JSON); defaults to [classifier] path in the settings
    #[arg(short, long)]
    classifier: Option<PathBuf>,

    /// Distribution for resonance statistics; defaults to the settings value
    #[arg(short, long, value_enum)]
    distribution: Option<CliDistribution>,

    /// Settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reject outlier windows before identification
    #[arg(long)]
    reject: bool,

    /// Write the full result as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the labeled peak table as CSV
    #[arg(long)]
    peaks_csv: Option<PathBuf>,

    /// Write an .hv report (mean curve, +/-1 std band, f0 statistics)
    #[arg(long, value_name = "FILE")]
    hv: Option<PathBuf>,

    /// Header layout of the .hv report
    #[arg(long, value_enum, default_value = "hvsrpy")]
    hv_style: CliHvStyle,
}

pub fn run(args: IdentifyArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    let distribution: Distribution = args
        .distribution
        .map_or(settings.statistics.distribution, Distribution::from);

    // Classifier problems surface before any curve is read
    let artifact = classifier_path(args.classifier, &settings)?;
    let pipeline = AutoHvsr::from_artifact(&artifact)?.with_config(settings.pipeline);

    let mut curves = io::read_curve_set(&args.curves)?;
    println!(
        "Loaded {} windows x {} frequencies from {}",
        curves.n_windows(),
        curves.n_frequencies(),
        args.curves.display()
    );

    if args.reject || settings.rejection.enabled {
        let outcome = reject_windows(
            &curves,
            &settings.rejection.to_config(),
            distribution,
            settings.pipeline.mean_curve_distribution,
        )?;
        println!(
            "Window rejection: {} of {} windows rejected after {} iterations",
            outcome.n_rejected(),
            outcome.accepted.len(),
            outcome.iterations
        );
        print_fundamental("After rejection", &outcome.after);
        curves = curves.select_windows(&outcome.accepted)?;
    }

    let result = pipeline.identify(&curves, distribution)?;
    println!(
        "\n{} candidate peaks, {} valid, {} unclustered",
        result.peaks.len(),
        result.n_valid(),
        result.n_noise()
    );
    print_resonances(&result.resonances, distribution);

    if let Some(path) = &args.output {
        io::write_result_json(&result, path)?;
        println!("\nWrote results to {}", path.display());
    }
    if let Some(path) = &args.peaks_csv {
        io::write_peak_csv(&result.peaks, path)?;
        println!("Wrote peak table to {}", path.display());
    }
    if let Some(path) = &args.hv {
        let distribution_mc = settings.pipeline.mean_curve_distribution;
        let summary = FundamentalSummary::from_curves(&curves, distribution, distribution_mc)?;
        save_hv(&curves, &summary, distribution_mc, args.hv_style, path)?;
    }

    Ok(())
}
