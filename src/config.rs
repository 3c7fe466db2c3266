//! Runtime configuration.
//!
//! Resolved once at startup from an optional TOML file plus a few environment
//! overrides, then handed to the services that need it.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::data::{GEMINI_API_URL, GEMINI_MODEL, WORLD_GEOJSON_URL};
use crate::error::ConfigError;

const CONFIG_ENV: &str = "PHARM_ORIGIN_CONFIG";
const API_KEY_ENVS: &[&str] = &["PHARM_ORIGIN_API_KEY", "GEMINI_API_KEY", "API_KEY"];
const APP_DIR_NAME: &str = "pharm-origin";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub world_geojson_url: String,
    /// Base URL used to build shareable links. Without it (and without a
    /// launch URI) the location is opaque and sharing falls back to text.
    pub share_base_url: Option<String>,
    pub storage_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: GEMINI_MODEL.to_string(),
            api_base_url: GEMINI_API_URL.to_string(),
            world_geojson_url: WORLD_GEOJSON_URL.to_string(),
            share_base_url: None,
            storage_path: None,
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match config_file_path() {
            Some(path) if path.is_file() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Defaults plus environment overrides, used when the file is unusable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = API_KEY_ENVS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            self.api_key = Some(key);
        }
    }

    /// Where the key/value storage file lives.
    pub fn storage_file(&self) -> Option<PathBuf> {
        self.storage_path
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME).join("storage.json")))
    }
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let config = AppConfig::from_toml(
            r#"
            api_key = "abc"
            share_base_url = "https://example.org/explore"
            request_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.share_base_url.as_deref(), Some("https://example.org/explore"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.model, GEMINI_MODEL);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(matches!(
            AppConfig::from_toml("request_timeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn first_non_empty_env_key_wins() {
        let mut config = AppConfig::from_toml("api_key = \"from-file\"").unwrap();
        config.apply_env(|name| match name {
            "PHARM_ORIGIN_API_KEY" => Some("  ".to_string()),
            "GEMINI_API_KEY" => Some("gemini".to_string()),
            "API_KEY" => Some("plain".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("gemini"));
    }

    #[test]
    fn env_absent_keeps_file_key() {
        let mut config = AppConfig::from_toml("api_key = \"from-file\"").unwrap();
        config.apply_env(|_| None);
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn storage_path_override_is_used() {
        let config = AppConfig {
            storage_path: Some(PathBuf::from("/tmp/pharm/storage.json")),
            ..AppConfig::default()
        };
        assert_eq!(config.storage_file(), Some(PathBuf::from("/tmp/pharm/storage.json")));
    }
}
