//! Shared CLI helpers used across multiple commands.

use autohvsr_config::Settings;
use autohvsr_core::hv::{HvReport, HvStyle, write_hv};
use autohvsr_core::{Distribution, FundamentalSummary, HvsrCurveSet, ResonanceSummary};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

/// Distribution choices for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliDistribution {
    Normal,
    Lognormal,
}

impl From<CliDistribution> for Distribution {
    fn from(d: CliDistribution) -> Self {
        match d {
            CliDistribution::Normal => Distribution::Normal,
            CliDistribution::Lognormal => Distribution::Lognormal,
        }
    }
}

/// `.hv` report styles for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliHvStyle {
    #[default]
    Hvsrpy,
    Geopsy,
}

impl From<CliHvStyle> for HvStyle {
    fn from(s: CliHvStyle) -> Self {
        match s {
            CliHvStyle::Hvsrpy => HvStyle::Hvsrpy,
            CliHvStyle::Geopsy => HvStyle::Geopsy,
        }
    }
}

/// Write the `.hv` report of `curves`, summarized by `summary`.
pub fn save_hv(
    curves: &HvsrCurveSet,
    summary: &FundamentalSummary,
    distribution_mc: Distribution,
    style: CliHvStyle,
    path: &Path,
) -> anyhow::Result<()> {
    let report = HvReport::new(curves, summary, distribution_mc)?;
    let style = HvStyle::from(style);
    write_hv(&report, style, path)?;
    println!("Wrote {style}-style report to {}", path.display());
    Ok(())
}

/// Load settings from `--config`, `./autohvsr.toml`, the user config dir, or defaults.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let (settings, source) = Settings::discover(explicit)?;
    match source {
        Some(path) => tracing::debug!(path = %path.display(), "loaded settings"),
        None => tracing::debug!("no settings file, using defaults"),
    }
    Ok(settings)
}

/// Classifier artifact from the command line, else from the settings file.
pub fn classifier_path(arg: Option<PathBuf>, settings: &Settings) -> anyhow::Result<PathBuf> {
    arg.or_else(|| settings.classifier.path.clone()).ok_or_else(|| {
        anyhow::anyhow!(
            "no classifier artifact given; \
             pass --classifier or set [classifier] path in autohvsr.toml"
        )
    })
}

/// Format a statistic's spread with the right unit for its distribution.
fn spread(d: Distribution, std: f64) -> String {
    match d {
        Distribution::Normal => format!("{std:.3}"),
        Distribution::Lognormal => format!("{std:.3} (ln)"),
    }
}

/// Print the per-resonance table.
pub fn print_resonances(resonances: &[ResonanceSummary], distribution: Distribution) {
    if resonances.is_empty() {
        println!("No resonances identified.");
        return;
    }
    let label = distribution.location_label();
    println!(
        "  {:>3}  {:>6}  {:>10}  {:>12}  {:>9}  {:>10}  {:>9}",
        "id",
        "peaks",
        format!("f {label}"),
        "f std",
        "T (s)",
        "A",
        "f mc"
    );
    for r in resonances {
        println!(
            "  {:>3}  {:>6}  {:>7.3} Hz  {:>12}  {:>9.3}  {:>10.3}  {:>6.3} Hz",
            r.resonance_id,
            r.n_peaks,
            r.frequency.mean,
            spread(distribution, r.frequency.std),
            r.period(),
            r.amplitude.mean,
            r.mean_curve_peak.frequency
        );
    }
}

/// Print the f0 / T0 statistics table.
pub fn print_fundamental(title: &str, summary: &FundamentalSummary) {
    let d = summary.f0.distribution;
    println!("{title} ({} windows, {d}):", summary.n_windows);
    println!(
        "  f0     {} = {:.3} Hz, std = {}",
        d.location_label(),
        summary.f0.mean,
        spread(d, summary.f0.std)
    );
    println!("  T0     {} = {:.3} s", d.location_label(), summary.period());
    println!(
        "  f0,mc  {:.3} Hz (amplitude {:.3})",
        summary.mean_curve_peak.frequency, summary.mean_curve_peak.amplitude
    );
}
