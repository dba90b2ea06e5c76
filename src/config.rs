//! Configuration management for groupcast
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{GroupcastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for groupcast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Delivery backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Identity provider settings
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Composer settings
    #[serde(default)]
    pub composer: ComposerConfig,

    /// Local draft storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Delivery backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend, e.g. `https://bot.example.com`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional per-request timeout. Requests do not time out when unset.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: None,
        }
    }
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the password sign-in REST API
    #[serde(default = "default_identity_endpoint")]
    pub endpoint: String,

    /// Web API key of the identity project; required only for `login`
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_identity_endpoint() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            endpoint: default_identity_endpoint(),
            api_key: None,
        }
    }
}

/// Composer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Key under which the draft HTML is persisted
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Placeholder shown while the document is empty
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Label of the submit action when idle
    #[serde(default = "default_submit_label")]
    pub submit_label: String,
}

fn default_storage_key() -> String {
    "composer-draft".to_string()
}

fn default_placeholder() -> String {
    "Start writing...".to_string()
}

fn default_submit_label() -> String {
    "Send".to_string()
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            placeholder: default_placeholder(),
            submit_label: default_submit_label(),
        }
    }
}

/// Draft storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the draft database; defaults to the user's data directory
    #[serde(default)]
    pub draft_db: Option<String>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GroupcastError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| GroupcastError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("GROUPCAST_API_URL") {
            self.backend.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("GROUPCAST_REQUEST_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.backend.request_timeout_seconds = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid GROUPCAST_REQUEST_TIMEOUT: {}", timeout),
            }
        }

        if let Ok(endpoint) = std::env::var("GROUPCAST_IDENTITY_ENDPOINT") {
            self.identity.endpoint = endpoint;
        }

        if let Ok(api_key) = std::env::var("GROUPCAST_IDENTITY_API_KEY") {
            self.identity.api_key = Some(api_key);
        }

        if let Ok(key) = std::env::var("GROUPCAST_DRAFT_KEY") {
            self.composer.storage_key = key;
        }

        if let Ok(db) = std::env::var("GROUPCAST_DRAFT_DB") {
            self.storage.draft_db = Some(db);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            tracing::debug!("Using backend URL override from CLI: {}", api_url);
            self.backend.base_url = api_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(
                GroupcastError::Config("backend.base_url cannot be empty".to_string()).into(),
            );
        }

        let parsed = url::Url::parse(&self.backend.base_url).map_err(|e| {
            GroupcastError::Config(format!(
                "backend.base_url is not a valid URL ({}): {}",
                self.backend.base_url, e
            ))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(GroupcastError::Config(format!(
                "backend.base_url must use http or https, got {}",
                parsed.scheme()
            ))
            .into());
        }

        if self.backend.request_timeout_seconds == Some(0) {
            return Err(GroupcastError::Config(
                "backend.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.identity.endpoint.trim().is_empty() {
            return Err(
                GroupcastError::Config("identity.endpoint cannot be empty".to_string()).into(),
            );
        }

        if self.composer.storage_key.trim().is_empty() {
            return Err(
                GroupcastError::Config("composer.storage_key cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Returns the identity API key or a configuration error
    pub fn require_api_key(&self) -> Result<&str> {
        match self.identity.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(GroupcastError::Config(
                "identity.api_key is required to sign in (set GROUPCAST_IDENTITY_API_KEY)"
                    .to_string(),
            )
            .into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            identity: IdentityConfig::default(),
            composer: ComposerConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}
