use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app::infrastructure::error::{AppError, Result};

pub const SERVER_URL_ENV: &str = "LABELPAD_SERVER_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_autosave_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_log_filter() -> String {
    "labelpad=info,label_pad=info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            autosave_delay_ms: default_autosave_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file is created with defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => {
                // File doesn't exist, use defaults
                let default = Self::default();
                // Try to save defaults for next time
                let _ = default.save_to(path);
                return Ok(default);
            }
        };
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from the default location, but fall back to defaults on a corrupt or
    /// invalid file. The failure is handed back so it can be logged once a
    /// subscriber is installed.
    pub fn load_or_default() -> (Self, Option<AppError>) {
        Self::load_or_default_from(&Self::get_config_path())
    }

    pub fn load_or_default_from(path: &Path) -> (Self, Option<AppError>) {
        match Self::load_from(path) {
            Ok(settings) => (settings, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        Ok(())
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("labelpad");
        path.push("settings.json");
        path
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(AppError::Settings("server_url is empty".to_string()));
        }
        if self.autosave_delay_ms == 0 {
            return Err(AppError::Settings(
                "autosave_delay_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply the environment override for the server URL, if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                self.server_url = url;
            }
        }
        self
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}
