//! AutoHVSR CLI - automatic resonance identification for HVSR curve sets.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "autohvsr")]
#[command(
    author,
    version,
    about = "Automatic multi-resonance identification for HVSR curves",
    long_about = None
)]
struct Cli {
    /// Log pipeline stages (debug level) unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify resonances in a curve set
    Identify(commands::identify::IdentifyArgs),

    /// List candidate peaks and their feature vectors
    Peaks(commands::peaks::PeaksArgs),

    /// Reject outlier windows and report f0 statistics
    Reject(commands::reject::RejectArgs),

    /// Generate a synthetic curve set
    Generate(commands::generate::GenerateArgs),

    /// Show or create the settings file
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Identify(args) => commands::identify::run(args),
        Commands::Peaks(args) => commands::peaks::run(args),
        Commands::Reject(args) => commands::reject::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
