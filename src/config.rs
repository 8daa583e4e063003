//! Configuration management for rfantibody-client
//!
//! Config file location:
//! - Linux: ~/.config/rfantibody-client/config.toml
//! - macOS: ~/Library/Application Support/org.rfantibody.rfantibody-client/config.toml
//! - Windows: %APPDATA%/rfantibody/rfantibody-client/config/config.toml
//!
//! You can override the config location by setting `RFANTIBODY_CONFIG_PATH`
//! and the pipeline base URL by setting `RFANTIBODY_API_BASE_URL`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::api::{ApiBase, ApiError, DEFAULT_BASE_PATH};

const CONFIG_PATH_ENV: &str = "RFANTIBODY_CONFIG_PATH";
const BASE_URL_ENV: &str = "RFANTIBODY_API_BASE_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Pipeline endpoint configuration
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

            let config: Config = toml::from_str(&content).with_context(|| {
                format!("Failed to parse config from {}", config_path.display())
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, toml)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let proj_dirs = project_dirs()?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Create default config file if it doesn't exist
    pub fn init() -> Result<Self> {
        let config = Self::load()?;

        let config_path = Self::config_path()?;
        if !config_path.exists() {
            config.save()?;
        }

        Ok(config)
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "rfantibody", "rfantibody-client")
        .context("Could not determine project directories")
}

/// Pipeline API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Pipeline base URL; absolute, or a path joined onto `origin`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Scheme, host and port used when `base_url` is a path
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Whether to verify SSL certificates
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            origin: default_origin(),
            verify_ssl: default_true(),
        }
    }
}

impl ApiConfig {
    /// Resolve the pipeline base once. Precedence: explicit override, environment, config file.
    pub fn resolve_base(&self, base_override: Option<&str>) -> Result<ApiBase, ApiError> {
        let env_base = std::env::var(BASE_URL_ENV).ok();
        let base_url = pick_base_url(base_override, env_base.as_deref(), &self.base_url);
        ApiBase::resolve(base_url, &self.origin)
    }
}

fn pick_base_url<'a>(
    base_override: Option<&'a str>,
    env_base: Option<&'a str>,
    configured: &'a str,
) -> &'a str {
    [base_override, env_base]
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .unwrap_or(configured)
}

fn default_base_url() -> String {
    DEFAULT_BASE_PATH.to_string()
}

fn default_origin() -> String {
    "http://localhost:8000".to_string()
}

fn default_true() -> bool {
    true
}

/// Get configuration file path for display purposes
pub fn get_config_path() -> Result<String> {
    let path = Config::config_path()?;
    Ok(path.display().to_string())
}

/// Initialize configuration (load or create default)
pub fn init_config() -> Result<Config> {
    Config::init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "/api");
        assert_eq!(config.api.origin, "http://localhost:8000");
        assert!(config.api.verify_ssl);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();

        assert!(toml.contains("[api]"));
        assert!(toml.contains("base_url"));
        assert!(toml.contains("origin"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("[api]\nbase_url = \"https://lab.example.org/api\"\n").unwrap();
        assert_eq!(config.api.base_url, "https://lab.example.org/api");
        assert_eq!(config.api.origin, "http://localhost:8000");
        assert!(config.api.verify_ssl);
    }

    #[test]
    fn test_base_url_precedence() {
        assert_eq!(pick_base_url(Some("https://cli"), Some("https://env"), "/api"), "https://cli");
        assert_eq!(pick_base_url(None, Some("https://env"), "/api"), "https://env");
        assert_eq!(pick_base_url(Some("  "), None, "/api"), "/api");
        assert_eq!(pick_base_url(None, None, "/custom"), "/custom");
    }

    #[test]
    fn test_resolve_base_with_override() {
        let api = ApiConfig::default();
        let base = api.resolve_base(Some("https://lab.example.org/api/")).unwrap();
        assert_eq!(base.as_str(), "https://lab.example.org/api");
    }
}
