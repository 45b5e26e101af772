//! Persisted settings for the report tool.
//!
//! Settings live in `settings.toml` under the platform config directory:
//! - macOS: ~/Library/Application Support/edu.umn.NIH Report/
//! - Windows: %APPDATA%/umn/NIH Report/config/
//! - Linux: ~/.config/nihreport/
//!
//! A `--config` path replaces that location. Command-line flags and the
//! `NIH_REPORT_API_KEY` environment variable override what the file says.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};

use crate::logging::REDACTED_VALUE;

const APP_QUALIFIER: &str = "edu";
const APP_ORG: &str = "umn";
const APP_NAME: &str = "NIH Report";
const CONFIG_FILENAME: &str = "settings.toml";

pub const DEFAULT_API_URL: &str = "https://redcap.ahc.umn.edu/api/";
pub const DEFAULT_RECORD_ID_FIELD: &str = "record_id";

// ============================================================================
// Settings
// ============================================================================

/// Application settings (persisted to disk as TOML).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub redcap: RedcapSettings,
    pub export: ExportSettings,
}

impl Settings {
    /// Copy with the API key replaced by a placeholder, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.redcap.api_key.is_some() {
            copy.redcap.api_key = Some(REDACTED_VALUE.to_string());
        }
        copy
    }
}

/// Where and how to reach the REDCap project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedcapSettings {
    /// API endpoint of the REDCap instance.
    pub api_url: String,
    /// Project API token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Field holding the record identifier.
    pub record_id_field: String,
}

impl Default for RedcapSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            record_id_field: DEFAULT_RECORD_ID_FIELD.to_string(),
        }
    }
}

/// Export defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory for exports written without an explicit path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl ExportSettings {
    /// Configured directory, else the user's documents folder, else the
    /// current directory.
    #[must_use]
    pub fn resolved_directory(&self) -> PathBuf {
        if let Some(dir) = &self.directory {
            return dir.clone();
        }
        UserDirs::new()
            .and_then(|dirs| dirs.document_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

// ============================================================================
// Persistence
// ============================================================================

/// Platform settings file path, `None` when no home directory is known.
#[must_use]
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Load settings from `explicit`, or from the platform path.
///
/// Falls back to defaults when no path is known, the file is missing or it
/// cannot be parsed.
#[must_use]
pub fn load_settings(explicit: Option<&Path>) -> Settings {
    match explicit.map(Path::to_path_buf).or_else(settings_path) {
        Some(path) => load_settings_from(&path),
        None => {
            tracing::warn!("could not determine settings path, using defaults");
            Settings::default()
        }
    }
}

/// Load settings from `path`, falling back to defaults.
#[must_use]
pub fn load_settings_from(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to parse settings file: {e}, using defaults");
                Settings::default()
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no settings file, using defaults");
            Settings::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to read settings file: {e}, using defaults");
            Settings::default()
        }
    }
}

/// Write settings to `path`, creating its directory if needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(settings).context("serialize settings")?;
    fs::write(path, content).with_context(|| format!("write settings file {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved settings");
    Ok(())
}
