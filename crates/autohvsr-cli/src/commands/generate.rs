//! Synthetic curve set generation command.

use autohvsr_core::io;
use autohvsr_core::synthetic::{SyntheticConfig, SyntheticResonance, generate};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    /// Output file (.json, or a text table for any other extension)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Number of windows
    #[arg(long, default_value = "40")]
    windows: usize,

    /// Number of log-spaced frequency samples
    #[arg(long, default_value = "256")]
    frequencies: usize,

    /// Lowest frequency in Hz
    #[arg(long, default_value = "0.2")]
    min_frequency: f64,

    /// Highest frequency in Hz
    #[arg(long, default_value = "20.0")]
    max_frequency: f64,

    /// Resonance as FREQ:AMP[:FRACTION] (repeatable; default 2.0:4.0)
    #[arg(long = "resonance", value_name = "FREQ:AMP[:FRACTION]")]
    resonances: Vec<SyntheticResonance>,

    /// Multiplicative noise level
    #[arg(long, default_value = "0.01")]
    noise: f64,

    /// Random seed
    #[arg(long, default_value = "305419896")]
    seed: u32,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let defaults = SyntheticConfig::default();
    let config = SyntheticConfig {
        n_windows: args.windows,
        n_frequencies: args.frequencies,
        min_frequency: args.min_frequency,
        max_frequency: args.max_frequency,
        resonances: if args.resonances.is_empty() {
            defaults.resonances.clone()
        } else {
            args.resonances
        },
        noise: args.noise,
        seed: args.seed,
        ..defaults
    };

    let curves = generate(&config)?;
    io::write_curve_set(&curves, &args.output)?;

    println!(
        "Generated {} windows x {} frequencies ({:.2}-{:.2} Hz)",
        curves.n_windows(),
        curves.n_frequencies(),
        config.min_frequency,
        config.max_frequency
    );
    for r in &config.resonances {
        println!(
            "  resonance {:.3} Hz, amplitude {:.2}, in {:.0}% of windows",
            r.frequency,
            r.amplitude,
            r.fraction * 100.0
        );
    }
    println!("Wrote {}", args.output.display());

    Ok(())
}
