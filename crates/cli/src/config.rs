//! Configuration file loading and environment variable handling.
//!
//! Precedence: CLI args > Environment vars > Config file > Defaults

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use evaldash_core::client::{DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECS};

use crate::render::View;

/// Default config file content for `--config-init`.
pub const DEFAULT_CONFIG: &str = r#"# evaldash configuration
# See: evaldash --help for all options

# Base URL of the evaluation API
api_base_url = "http://localhost:3000"

# Request timeout in seconds
timeout = 30

# Default view: "pm" (labeled cards) or "dev" (raw JSON)
view = "pm"

# Disable colored output
no_color = false
"#;

/// Env vars checked for the API base URL, in order.
pub const API_BASE_URL_VARS: [&str; 2] = ["EVALDASH_API_BASE_URL", "API_BASE_URL"];

/// Configuration loaded from file and environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub timeout: Option<u64>,
    pub view: Option<String>,
    pub no_color: Option<bool>,
}

impl Config {
    /// Get the config file path.
    ///
    /// - Linux: `~/.config/evaldash/config.toml`
    /// - macOS: `~/Library/Application Support/evaldash/config.toml`
    /// - Windows: `%APPDATA%\evaldash\config.toml`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("evaldash").join("config.toml"))
    }

    /// Load config from file. Returns default if file doesn't exist.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };

        let Ok(contents) = fs::read_to_string(&path) else {
            return Self::default();
        };

        Self::parse(&contents).unwrap_or_else(|e| {
            tracing::warn!("ignoring {}: {}", path.display(), e);
            eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Read value from environment variable.
    fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
        std::env::var(name).ok()?.parse().ok()
    }

    /// Name of the first API base URL env var that is set.
    pub fn api_base_url_env() -> Option<&'static str> {
        API_BASE_URL_VARS
            .into_iter()
            .find(|name| std::env::var(name).is_ok_and(|v| !v.is_empty()))
    }

    /// Get api_base_url with precedence: env > config > default.
    pub fn api_base_url(&self) -> String {
        Self::api_base_url_env()
            .and_then(|name| std::env::var(name).ok())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// Get timeout with precedence: env > config > default.
    pub fn timeout(&self) -> u64 {
        Self::env_var("EVALDASH_TIMEOUT")
            .or(self.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Get view with precedence: env > config > default.
    ///
    /// Unknown names fall through to the next source.
    pub fn view(&self) -> View {
        Self::env_var("EVALDASH_VIEW")
            .or_else(|| self.view.as_deref().and_then(|v| v.parse().ok()))
            .unwrap_or_default()
    }

    /// Get no_color with precedence: env > config > default.
    ///
    /// Respects the `NO_COLOR` standard (https://no-color.org/).
    pub fn no_color(&self) -> bool {
        if std::env::var("NO_COLOR").is_ok() {
            return true;
        }
        if std::env::var("EVALDASH_NO_COLOR").is_ok() {
            return true;
        }
        self.no_color.unwrap_or(false)
    }
}

/// Create a default config file at the standard location.
pub fn init_config() -> Result<PathBuf, String> {
    let path = Config::path().ok_or("Cannot determine config directory")?;

    if path.exists() {
        return Err(format!("Config file already exists: {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create directory: {}", e))?;
    }

    fs::write(&path, DEFAULT_CONFIG).map_err(|e| format!("Failed to write config: {}", e))?;

    Ok(path)
}
