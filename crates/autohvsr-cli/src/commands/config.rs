//! Settings file management commands.

use autohvsr_config::{Settings, paths};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::common::load_settings;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective settings as TOML
    Show {
        /// Settings file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a settings file with default values
    Init {
        /// Destination (default: the user settings file)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print where settings are looked up
    Path,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { config } => {
            let settings = load_settings(config.as_deref())?;
            print!("{}", settings.to_toml()?);
        }
        ConfigCommand::Init { path, force } => {
            let path = match path {
                Some(p) => p,
                None => {
                    paths::ensure_user_config_dir()?;
                    paths::user_settings_path()
                }
            };
            anyhow::ensure!(
                force || !path.exists(),
                "{} already exists (use --force to overwrite)",
                path.display()
            );
            Settings::default().save(&path)?;
            println!("Wrote default settings to {}", path.display());
        }
        ConfigCommand::Path => {
            println!("Search order:");
            println!("  1. --config <FILE>");
            println!("  2. ./{}", paths::SETTINGS_FILE);
            println!("  3. {}", paths::user_settings_path().display());
            match paths::find_settings(None) {
                Some(p) => println!("Active: {}", p.display()),
                None => println!("Active: none (defaults)"),
            }
        }
    }
    Ok(())
}
