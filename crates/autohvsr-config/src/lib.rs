//! Settings management for the AutoHVSR tools.
//!
//! A single TOML file (`autohvsr.toml`) carries the pipeline hyperparameters,
//! the default classifier artifact, the statistics distribution, and the
//! window rejection options. Values are range-checked on load.
//!
//! # Example
//!
//! ```rust,no_run
//! use autohvsr_config::{Settings, paths};
//!
//! let (settings, source) = Settings::discover(None).unwrap();
//! println!("loaded from {:?}", source);
//!
//! let mut settings = settings;
//! settings.rejection.enabled = true;
//! settings.save(paths::user_settings_path()).unwrap();
//! ```

mod error;
mod settings;

/// Platform-specific settings locations.
pub mod paths;

/// Settings value checks.
pub mod validation;

pub use error::ConfigError;
pub use paths::{find_settings, user_config_dir, user_settings_path};
pub use settings::{ClassifierSettings, RejectionSettings, Settings, StatisticsSettings};
pub use validation::{ValidationError, ValidationResult, validate_settings};
