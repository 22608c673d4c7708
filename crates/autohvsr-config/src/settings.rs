//! The `autohvsr.toml` settings file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use autohvsr_core::{Distribution, PipelineConfig, RejectionConfig};

use crate::error::ConfigError;
use crate::validation::validate_settings;

/// Settings for the `autohvsr` tool.
///
/// Every section and field is optional; missing values take their defaults.
///
/// # TOML Format
///
/// ```toml
/// [statistics]
/// distribution = "lognormal"
///
/// [classifier]
/// path = "/opt/models/peak-forest.json"
///
/// [rejection]
/// enabled = true
/// n = 2.0
/// max_iterations = 50
///
/// [pipeline]
/// mean_curve_distribution = "lognormal"
///
/// [pipeline.peaks]
/// min_prominence = 0.25
///
/// [pipeline.cluster]
/// eps = 0.2
/// min_samples = 10
/// gamma = 0.02
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Statistics reported for resonances and f0.
    pub statistics: StatisticsSettings,
    /// Where to find the peak classifier.
    pub classifier: ClassifierSettings,
    /// Window rejection before identification.
    pub rejection: RejectionSettings,
    /// Pipeline hyperparameters.
    pub pipeline: PipelineConfig,
}

/// `[statistics]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsSettings {
    /// Distribution for resonance and f0 statistics.
    pub distribution: Distribution,
}

/// `[classifier]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Classifier artifact used when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// `[rejection]` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RejectionSettings {
    /// Run window rejection before `identify`.
    pub enabled: bool,
    /// Acceptance band half-width in standard deviations.
    pub n: f64,
    /// Iteration cap.
    pub max_iterations: usize,
}

impl Default for RejectionSettings {
    fn default() -> Self {
        let config = RejectionConfig::default();
        Self {
            enabled: false,
            n: config.n,
            max_iterations: config.max_iterations,
        }
    }
}

impl RejectionSettings {
    /// The core rejection parameters.
    pub fn to_config(&self) -> RejectionConfig {
        RejectionConfig {
            n: self.n,
            max_iterations: self.max_iterations,
        }
    }
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(toml_str)?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Save the settings to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load settings from the first file [`crate::paths::find_settings`]
    /// finds, or fall back to defaults.
    ///
    /// Returns the path the settings came from, if any. An explicit path
    /// that does not exist is an error.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit
            && !path.is_file()
        {
            return Err(ConfigError::read_file(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "settings file not found"),
            ));
        }
        match crate::paths::find_settings(explicit) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }
}
