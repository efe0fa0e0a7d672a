//! Settings file support
//!
//! Loads settings from ~/.traces-reader.toml (or
//! %USERPROFILE%\.traces-reader.toml on Windows)
//!
//! Example:
//! ```toml
//! # traces-reader settings
//! tick-interval-ms = 500
//! configurations = "/home/me/traces.json"
//! follow = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

const SETTINGS_FILE: &str = ".traces-reader.toml";

/// Shortest allowed tick interval in milliseconds
pub const MIN_TICK_INTERVAL_MS: u64 = 50;

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Reconciliation interval in follow mode
    pub tick_interval_ms: u64,
    /// JSON file holding the highlight configurations
    pub configurations: Option<PathBuf>,
    /// Keep watching files after the first render
    pub follow: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            configurations: None,
            follow: false,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(SETTINGS_FILE))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(SETTINGS_FILE))
        }
    }

    /// Load settings, falling back to defaults when the file is missing or bad
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Parse settings from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(contents)?;
        settings.tick_interval_ms = settings.tick_interval_ms.max(MIN_TICK_INTERVAL_MS);
        Ok(settings)
    }

    /// Set the tick interval, clamped to the minimum
    pub fn with_tick_interval(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms.max(MIN_TICK_INTERVAL_MS);
        self
    }
}
