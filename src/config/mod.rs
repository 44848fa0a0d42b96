// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Persisted user preferences stored as `settings.toml` in the platform
//! config directory (`~/.config/LinRZ/settings.toml` on Linux).
//!
//! # Examples
//!
//! ```text
//! let mut settings = config::load().unwrap_or_default();
//! settings.last_directory = Some("/home/me/Downloads".into());
//! config::save(&settings)?;
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::logic::ArchiveFormat;

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "LinRZ";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory shown in the browser on the previous run.
    #[serde(default)]
    pub last_directory: Option<PathBuf>,
    /// Format preselected in the "Add to Archive" dialog.
    #[serde(default)]
    pub default_format: Option<ArchiveFormat>,
}

impl Settings {
    /// Directory the browser opens in: the last one if it still exists,
    /// otherwise the home directory, otherwise `.`.
    pub fn start_directory(&self) -> PathBuf {
        self.last_directory
            .as_ref()
            .filter(|dir| dir.is_dir())
            .cloned()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Preselected compression format, ignoring formats that cannot be written.
    pub fn compress_format(&self) -> ArchiveFormat {
        self.default_format
            .filter(ArchiveFormat::can_compress)
            .unwrap_or_default()
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

/// Load settings from the platform config directory, or defaults when absent.
pub fn load() -> Result<Settings> {
    if let Some(path) = get_default_config_path()
        && path.exists()
    {
        return load_from_path(&path);
    }
    Ok(Settings::default())
}

/// Save settings to the platform config directory.
pub fn save(settings: &Settings) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(settings, &path);
    }
    Ok(())
}

/// Read settings from `path`. Unparseable TOML yields defaults.
pub fn load_from_path(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {:?}", path))?;
    Ok(toml::from_str(&content).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), %err, "ignoring invalid settings file");
        Settings::default()
    }))
}

/// Write settings to `path`, creating parent directories.
pub fn save_to_path(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
    }
    let content = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(path, content).with_context(|| format!("Failed to write settings {:?}", path))?;
    Ok(())
}
