//! Configuration resolution for Washbook.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/washbook/settings.json)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Server the hosted client talks to when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "https://gh-washing-machine-jt7u.onrender.com/api";

/// Complete Washbook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub refresh: RefreshConfig,
    pub display: DisplayConfig,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            refresh: RefreshConfig::default(),
            display: DisplayConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 15,
        }
    }
}

impl ApiConfig {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Polling cadence shared by the dashboard and global refresh loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl RefreshConfig {
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// View-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Number of machines shown on the public board and offered for booking.
    pub max_machines: usize,
    /// Lifetime of a toast message.
    pub message_ttl_secs: u64,
    /// Substitute the built-in demo dataset when the server is unreachable.
    pub demo_fallback: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_machines: 8,
            message_ttl_secs: 5,
            demo_fallback: true,
        }
    }
}

impl DisplayConfig {
    pub const fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.message_ttl_secs)
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            debug!(path = %global_path.display(), "Loading global config");
            config = load_config_file(&global_path)?;
        }
    }

    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".washbook").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/washbook/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("washbook").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("WASHBOOK_API_BASE") {
        config.api.base_url = val;
    }
    if let Some(n) = parsed_env("WASHBOOK_REFRESH_SECS") {
        config.refresh.interval_secs = n;
    }
    if let Some(n) = parsed_env("WASHBOOK_MESSAGE_SECS") {
        config.display.message_ttl_secs = n;
    }
    if let Some(b) = parsed_env("WASHBOOK_DEMO_FALLBACK") {
        config.display.demo_fallback = b;
    }
    if let Ok(val) = std::env::var("WASHBOOK_LOG_LEVEL") {
        config.log_level = val;
    }
}

fn parsed_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let val = std::env::var(key).ok()?;
    let parsed = val.trim().parse().ok();
    if parsed.is_none() {
        warn!(key, value = %val, "Ignoring unparseable environment override");
    }
    parsed
}

/// Reject settings that would make the client misbehave silently.
pub fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        return Err(Error::Config("api.base_url is empty".into()));
    }
    if config.refresh.interval_secs == 0 {
        return Err(Error::Config("refresh.interval_secs must be positive".into()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_polls_every_30s() {
        let config = Config::default();
        assert_eq!(config.refresh.interval(), Duration::from_secs(30));
    }

    #[test]
    fn default_config_shows_8_machines_and_5s_messages() {
        let config = Config::default();
        assert_eq!(config.display.max_machines, 8);
        assert_eq!(config.display.message_ttl(), Duration::from_secs(5));
        assert!(config.display.demo_fallback);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"api":{"base_url":"http://localhost:5000/api"}}"#).unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.request_timeout_secs, 15);
        assert_eq!(config.refresh.interval_secs, 30);
    }

    #[test]
    fn unparseable_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = Config::default();
        config.refresh.interval_secs = 0;
        assert!(validate(&config).is_err());
    }
}
