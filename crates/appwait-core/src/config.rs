//! Persistent configuration for appwait.
//!
//! Stores suite settings in `~/.appwait/config.json`: the default wait timings,
//! the deep-link scheme of the app under test, its bundle ids, and the base
//! URL of the web shop. Every field is optional in the file and falls back to
//! its default.
//!
//! # Example
//!
//! ```no_run
//! use appwait_core::config::E2eConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = E2eConfig::load();
//! println!("waiting up to {}ms", config.wait.timeout_ms());
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wait::WaitConfig;

const CONFIG_DIRNAME: &str = ".appwait";
const CONFIG_FILENAME: &str = "config.json";

/// Errors that can occur when reading or writing a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid config JSON (including invalid wait timings).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Returns the appwait config directory (`~/.appwait`).
///
/// Falls back to the current directory when no home directory is known.
pub fn appwait_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIRNAME)
}

/// Path of the default config file.
pub fn default_config_path() -> PathBuf {
    appwait_dir().join(CONFIG_FILENAME)
}

/// Persistent end-to-end suite configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eConfig {
    /// Default timeout and poll interval for UI waits.
    pub wait: WaitConfig,
    /// Scheme prepended to deep-link paths, e.g. `swaglabs://`.
    pub deep_link_scheme: String,
    /// Android package of the app under test.
    pub android_package: String,
    /// iOS bundle id of the app under test.
    pub ios_bundle_id: String,
    /// Base URL of the web shop.
    pub base_url: String,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            wait: WaitConfig::default(),
            deep_link_scheme: "swaglabs://".to_string(),
            android_package: "com.swaglabsmobileapp".to_string(),
            ios_bundle_id: "org.reactjs.native.example.SwagLabsMobileApp".to_string(),
            base_url: "https://www.saucedemo.com".to_string(),
        }
    }
}

impl E2eConfig {
    /// Load config from `~/.appwait/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(default_config_path()).unwrap_or_default()
    }

    /// Load config from an explicit path, reporting read and parse failures.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save config to an explicit path as pretty-printed JSON.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Save config as `config.json` inside `dir`, creating the directory if
    /// needed. Returns the path written.
    pub fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(CONFIG_FILENAME);
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `~/.appwait/config.json`, creating the directory if needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        self.save_in(appwait_dir())
    }

    /// Full deep-link URL for `path` under the configured scheme.
    pub fn deep_link_url(&self, path: &str) -> String {
        format!("{}{}", self.deep_link_scheme, path)
    }
}
