//! Configuration file handling for the CLI.
//!
//! Reads `$XDG_CONFIG_HOME/qr-bolt/config.toml` (or the platform equivalent). Values
//! become [`SettingChange`]s, so the same clamping applies as for interactive edits.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use qrbolt_business::{ErrorLevel, SettingChange};
use serde::{Deserialize, Serialize};

/// CLI configuration stored on disk
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Initial QR settings. Unset fields keep the built-in defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub size: Option<i64>,
    pub margin: Option<i64>,
    pub level: Option<ErrorLevel>,
    pub inverted: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Where downloads are written. Defaults to the current directory.
    pub directory: Option<PathBuf>,
    /// Set to `false` to never touch the system clipboard.
    pub clipboard: Option<bool>,
}

impl Config {
    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "qrbolt", "qr-bolt")
            .context("Failed to determine config directory")?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Setting edits for every configured default, in field order.
    pub fn setting_changes(&self) -> Vec<SettingChange> {
        let d = &self.defaults;
        [
            d.size.map(SettingChange::Size),
            d.margin.map(SettingChange::Margin),
            d.level.map(SettingChange::Level),
            d.inverted.map(SettingChange::Inverted),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn clipboard_enabled(&self) -> bool {
        self.export.clipboard.unwrap_or(true)
    }
}
