//! Settings persistence with atomic writes.
//!
//! One TOML file holds the scalar application settings plus the serialized
//! user-template list. Writes go through a tmp file with an explicit fsync
//! before the atomic rename, so a crash never leaves a half-written file.
//! A missing or empty file deserializes to defaults.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use outreach_core::settings::AppSettings;
use outreach_core::template::Template;
use outreach_core::Result;

/// On-disk shape of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFile {
    #[serde(default)]
    pub settings: AppSettings,
    /// User-created templates; system templates are never persisted here.
    #[serde(default)]
    pub user_templates: Vec<Template>,
}

/// A handle to the settings file.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store over an explicit file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Creates a store at the default per-user location.
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(crate::paths::settings_file()?))
    }

    /// Loads the settings file; missing or empty file yields defaults.
    pub fn load(&self) -> Result<SettingsFile> {
        if !self.path.exists() {
            return Ok(SettingsFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(SettingsFile::default());
        }
        Ok(toml::from_str(&content)?)
    }

    /// Saves atomically: serialize, write tmp, fsync, rename.
    pub fn save(&self, file: &SettingsFile) -> Result<()> {
        let content = toml::to_string_pretty(file)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("toml.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(content.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        tracing::debug!("settings saved: {:?}", self.path);
        Ok(())
    }

    /// Loads only the scalar settings.
    pub fn load_settings(&self) -> Result<AppSettings> {
        Ok(self.load()?.settings)
    }

    /// Persists the scalar settings, keeping the stored templates.
    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let mut file = self.load()?;
        file.settings = settings.clone();
        self.save(&file)
    }

    /// Loads only the user-template list.
    pub fn load_user_templates(&self) -> Result<Vec<Template>> {
        Ok(self.load()?.user_templates)
    }

    /// Persists the user-template list, keeping the stored settings.
    pub fn save_user_templates(&self, templates: &[Template]) -> Result<()> {
        let mut file = self.load()?;
        file.user_templates = templates.to_vec();
        self.save(&file)
    }
}
