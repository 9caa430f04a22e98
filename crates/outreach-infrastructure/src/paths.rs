//! Centralized path management for persisted configuration.

use std::path::PathBuf;

use outreach_core::{OutreachError, Result};

/// The application's config directory (`~/.config/outreach` on Linux).
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("outreach"))
        .ok_or_else(|| OutreachError::io("could not determine the user config directory"))
}

/// The settings file path inside the config directory.
pub fn settings_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("settings.toml"))
}
