//! Application configuration.
//!
//! Stored in `~/.config/energysim/config.toml`; every field is optional and
//! environment variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the simulation service.
    pub api_url: String,

    /// Hosted auth and row-store backend. Without it history is kept locally.
    pub backend: Option<HostedBackendConfig>,

    /// Directory of the local history store.
    pub history_dir: Option<PathBuf>,

    /// Where the signed-in session is kept between invocations.
    pub session_file: Option<PathBuf>,

    /// Per-request timeout; requests wait indefinitely when unset.
    pub request_timeout_s: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            backend: None,
            history_dir: None,
            session_file: None,
            request_timeout_s: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedBackendConfig {
    pub url: String,
    /// Public (anon) API key sent as `apikey`.
    pub anon_key: String,
}

impl AppConfig {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("energysim"))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// File at the default location (if any) plus environment overrides.
    pub fn load() -> AppResult<Self> {
        let config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|err| AppError::ConfigParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Applies `ENERGYSIM_*` overrides read through `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("ENERGYSIM_API_URL").filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        let backend_url = lookup("ENERGYSIM_BACKEND_URL").filter(|v| !v.is_empty());
        let backend_key = lookup("ENERGYSIM_BACKEND_KEY").filter(|v| !v.is_empty());
        match (backend_url, backend_key) {
            (Some(url), Some(anon_key)) => {
                self.backend = Some(HostedBackendConfig { url, anon_key });
            }
            (Some(url), None) => {
                if let Some(existing) = self.backend.as_mut() {
                    existing.url = url;
                }
            }
            (None, Some(anon_key)) => {
                if let Some(existing) = self.backend.as_mut() {
                    existing.anon_key = anon_key;
                }
            }
            (None, None) => {}
        }
        if let Some(dir) = lookup("ENERGYSIM_HISTORY_DIR").filter(|v| !v.is_empty()) {
            self.history_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_s.map(Duration::from_secs)
    }

    pub fn history_dir(&self) -> PathBuf {
        self.history_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("energysim").join("history")))
            .unwrap_or_else(|| PathBuf::from(".energysim").join("history"))
    }

    pub fn session_file(&self) -> PathBuf {
        self.session_file
            .clone()
            .or_else(|| Self::config_dir().map(|d| d.join("session.json")))
            .unwrap_or_else(|| PathBuf::from(".energysim").join("session.json"))
    }
}
