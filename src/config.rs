//! Configuration management for Scholia
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! The provider API key is not resolved here; the model
//! gateway reads it when it first builds a provider.

use crate::error::{Result, ScholiaError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Scholia
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Provider configuration (Gemini)
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Conversation session settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Provider configuration
///
/// Specifies which AI provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_provider_type() -> String {
    "gemini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Google Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeminiConfig {
    /// Model to use for generation
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (overridable so tests can point at a mock server)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Explicit API key; takes precedence over `api_key_env` when set.
    /// Never written back out.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// HTTP timeout for a single generation call (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
            api_key_env: default_api_key_env(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Conversation session configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Greeting shown at the top of a chat session.
    ///
    /// `None` uses the module's built-in greeting; an empty string disables it.
    #[serde(default)]
    pub greeting: Option<String>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
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
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ScholiaError::Configuration(format!("Failed to read config file: {}", e))
        })?;
        serde_yaml::from_str(&contents).map_err(|e| {
            ScholiaError::Configuration(format!("Failed to parse config: {}", e)).into()
        })
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("SCHOLIA_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("SCHOLIA_GEMINI_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("SCHOLIA_GEMINI_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(api_key_env) = std::env::var("SCHOLIA_GEMINI_API_KEY_ENV") {
            self.provider.gemini.api_key_env = api_key_env;
        }

        if let Ok(timeout) = std::env::var("SCHOLIA_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.provider.gemini.timeout_seconds = value,
                Err(_) => tracing::warn!("Ignoring invalid SCHOLIA_TIMEOUT_SECONDS: {}", timeout),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(model) = cli.command.model_override() {
            tracing::debug!("Using model override from CLI: {}", model);
            self.provider.gemini.model = model.to_string();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let valid_providers = ["gemini"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(ScholiaError::Configuration(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        let gemini = &self.provider.gemini;
        if gemini.model.trim().is_empty() {
            return Err(
                ScholiaError::Configuration("gemini.model cannot be empty".to_string()).into(),
            );
        }

        if let Err(e) = url::Url::parse(&gemini.api_base) {
            return Err(ScholiaError::Configuration(format!(
                "gemini.api_base is not a valid URL ({}): {}",
                gemini.api_base, e
            ))
            .into());
        }

        if gemini.api_key_env.trim().is_empty() {
            return Err(ScholiaError::Configuration(
                "gemini.api_key_env cannot be empty".to_string(),
            )
            .into());
        }

        if gemini.timeout_seconds == 0 {
            return Err(ScholiaError::Configuration(
                "gemini.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
