//! Provider module for Scholia
//!
//! This module contains the AI provider abstraction and the Google Gemini
//! implementation.

pub mod base;
pub mod gemini;

pub use base::{GenerationRequest, GenerationResponse, InlineData, Provider, TokenUsage};
pub use gemini::GeminiProvider;

use crate::config::{GeminiConfig, ProviderConfig};
use crate::error::{Result, ScholiaError};

/// Resolve the Gemini API key
///
/// An explicit `api_key` in the configuration wins; otherwise the
/// environment variable named by `api_key_env` is read.
///
/// # Errors
///
/// Returns `ScholiaError::Configuration` when no non-empty key is available
///
/// # Examples
///
/// ```
/// use scholia::config::GeminiConfig;
/// use scholia::providers::resolve_api_key;
///
/// let config = GeminiConfig {
///     api_key: Some("explicit".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(resolve_api_key(&config).unwrap(), "explicit");
/// ```
pub fn resolve_api_key(config: &GeminiConfig) -> std::result::Result<String, ScholiaError> {
    if let Some(key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        return Ok(key.to_string());
    }

    match std::env::var(&config.api_key_env) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ScholiaError::Configuration(format!(
            "Gemini API key is not configured (set {})",
            config.api_key_env
        ))),
    }
}

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `config` - Provider configuration
///
/// # Returns
///
/// Returns a boxed provider instance
///
/// # Errors
///
/// Returns error if the provider type is invalid, the API key is missing,
/// or initialization fails
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match config.provider_type.as_str() {
        "gemini" => {
            let api_key = resolve_api_key(&config.gemini)?;
            Ok(Box::new(GeminiProvider::new(config.gemini.clone(), api_key)?))
        }
        other => Err(
            ScholiaError::Configuration(format!("Unknown provider type: {}", other)).into(),
        ),
    }
}
