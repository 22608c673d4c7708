//! Platform-specific locations of the settings file.
//!
//! - **User config**: `~/.config/autohvsr/` (Linux),
//!   `~/Library/Application Support/autohvsr/` (macOS), `%APPDATA%\autohvsr\` (Windows)
//! - **Settings file**: `autohvsr.toml`, looked up next to the working directory first

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "autohvsr";

/// File name of the settings file.
pub const SETTINGS_FILE: &str = "autohvsr.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the user settings file (which may not exist yet).
pub fn user_settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Find the settings file to use.
///
/// Searches in order: the explicit path, `./autohvsr.toml`, then the user
/// settings file. Only existing files are returned.
pub fn find_settings(explicit: Option<&Path>) -> Option<PathBuf> {
    find_settings_in(explicit, Path::new("."), &user_config_dir())
}

/// [`find_settings`] with the working and user directories spelled out.
pub fn find_settings_in(explicit: Option<&Path>, cwd: &Path, config_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.is_file().then(|| path.to_path_buf());
    }
    [cwd.join(SETTINGS_FILE), config_dir.join(SETTINGS_FILE)]
        .into_iter()
        .find(|p| p.is_file())
}

/// Ensure the user config directory exists.
///
/// Creates the directory and any parent directories if they don't exist.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}
