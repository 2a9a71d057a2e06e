//! Configuration management
//!
//! Settings live in `settings.json` inside the app directory:
//! ```json
//! {
//!   "api": { "baseUrl": "http://198.211.105.95:8080", "timeoutSecs": 30 }
//! }
//! ```
//! Keys this client does not know about are preserved when saving.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Public Ahorrista deployment
pub const DEFAULT_API_URL: &str = "http://198.211.105.95:8080";

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "AHORRISTA_API_URL";

/// Requests that take longer than this fail with a transport error
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Client configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    /// Whether `api_url` came from the environment rather than the file
    pub api_url_from_env: bool,
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_url_from_env: false,
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the app directory
    ///
    /// The base URL is taken from, in order:
    /// 1. `AHORRISTA_API_URL`
    /// 2. `api.baseUrl` in settings.json
    /// 3. the built-in default
    pub fn load(app_dir: &Path) -> Result<Self> {
        let settings_path = app_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {:?}", settings_path))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let env_url = std::env::var(API_URL_ENV).ok().filter(|v| !v.trim().is_empty());
        let api_url_from_env = env_url.is_some();
        let api_url = resolve_api_url(raw.api.base_url.as_deref(), env_url)?;
        // A zero timeout would fail every request; treat it as unset
        let timeout_secs = raw
            .api
            .timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let timeout = Duration::from_secs(timeout_secs);

        Ok(Self {
            api_url,
            timeout,
            api_url_from_env,
            _raw_settings: raw,
        })
    }

    /// Save config to the app directory
    /// Preserves other settings that the client doesn't manage
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let settings_path = app_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        // An env override is a per-process choice, never written back
        if !self.api_url_from_env {
            settings.api.base_url = Some(self.api_url.clone());
        }
        settings.api.timeout_secs = Some(self.timeout.as_secs());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Point the client at another backend
    pub fn set_api_url(&mut self, url: &str) -> Result<()> {
        self.api_url = normalize_api_url(url)?;
        self.api_url_from_env = false;
        Ok(())
    }

    pub fn set_timeout_secs(&mut self, secs: u64) -> Result<()> {
        if secs == 0 {
            anyhow::bail!("Timeout must be at least one second");
        }
        self.timeout = Duration::from_secs(secs);
        Ok(())
    }
}

fn resolve_api_url(from_settings: Option<&str>, from_env: Option<String>) -> Result<String> {
    match from_env.as_deref().or(from_settings) {
        Some(url) => normalize_api_url(url),
        None => Ok(DEFAULT_API_URL.to_string()),
    }
}

/// Validate a base URL and strip trailing slashes
fn normalize_api_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed).with_context(|| format!("Invalid API URL: {}", trimmed))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("API URL must use http or https: {}", trimmed);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
