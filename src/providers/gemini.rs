//! Google Gemini provider implementation for Scholia
//!
//! This module implements the Provider trait against the Gemini
//! `generateContent` endpoint. Each call is a single, non-streaming
//! request/response exchange.

use crate::config::GeminiConfig;
use crate::error::{Result, ScholiaError};
use crate::providers::{GenerationRequest, GenerationResponse, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Google Gemini API provider
///
/// # Examples
///
/// ```no_run
/// use scholia::config::GeminiConfig;
/// use scholia::providers::{GeminiProvider, GenerationRequest, Provider};
///
/// # async fn example() -> scholia::error::Result<()> {
/// let provider = GeminiProvider::new(GeminiConfig::default(), "api-key")?;
/// let response = provider
///     .generate(&GenerationRequest::text("What is social capital?"))
///     .await?;
/// println!("{}", response.text);
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

/// A content block (request or candidate)
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// One part of a content block: either text or inline binary data
#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(
        default,
        rename = "inline_data",
        alias = "inlineData",
        skip_serializing_if = "Option::is_none"
    )]
    inline_data: Option<GeminiInlineData>,
}

/// Inline binary payload in Gemini format
#[derive(Debug, Serialize, Deserialize)]
struct GeminiInlineData {
    #[serde(rename = "mime_type", alias = "mimeType")]
    mime_type: String,
    data: String,
}

/// Response body from `generateContent`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Arguments
    ///
    /// * `config` - Gemini configuration (model, API base, timeout)
    /// * `api_key` - Resolved API key
    ///
    /// # Errors
    ///
    /// Returns error if the key is empty or HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use scholia::config::GeminiConfig;
    /// use scholia::providers::GeminiProvider;
    ///
    /// let provider = GeminiProvider::new(GeminiConfig::default(), "key");
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: GeminiConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(
                ScholiaError::Configuration("Gemini API key is empty".to_string()).into(),
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("scholia/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ScholiaError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "Initialized Gemini provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Build the `generateContent` URL for the configured model
    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Convert a Scholia request into Gemini format
    ///
    /// Inline parts come first, followed by the prompt text.
    fn convert_request(&self, request: &GenerationRequest) -> GeminiRequest {
        let mut parts: Vec<GeminiPart> = request
            .inline_data
            .iter()
            .map(|part| GeminiPart {
                text: None,
                inline_data: Some(GeminiInlineData {
                    mime_type: part.mime_type.clone(),
                    data: part.data.clone(),
                }),
            })
            .collect();

        if !request.prompt.is_empty() {
            parts.push(GeminiPart {
                text: Some(request.prompt.clone()),
                inline_data: None,
            });
        }

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts,
            }],
        }
    }
}

/// Extract the text of the first candidate
fn extract_text(response: &GeminiResponse) -> Result<String> {
    let Some(candidate) = response.candidates.first() else {
        let reason = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.clone())
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(
            ScholiaError::Generation(format!("Gemini returned no output: {}", reason)).into(),
        );
    };

    let texts: Vec<&str> = candidate
        .content
        .as_ref()
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if texts.is_empty() {
        let reason = candidate
            .finish_reason
            .clone()
            .unwrap_or_else(|| "empty candidate".to_string());
        return Err(ScholiaError::Generation(format!(
            "Gemini candidate contained no text: {}",
            reason
        ))
        .into());
    }

    Ok(texts.concat())
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let url = self.endpoint_url();
        let body = self.convert_request(request);

        tracing::debug!(
            "Sending Gemini request: model={}, {} inline parts, prompt_chars={}",
            self.config.model,
            request.inline_data.len(),
            request.prompt.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                ScholiaError::Generation(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(ScholiaError::Generation(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            ScholiaError::Generation(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = extract_text(&gemini_response)?;

        let response = match gemini_response.usage_metadata {
            Some(usage) => {
                let usage = TokenUsage::new(usage.prompt_token_count, usage.candidates_token_count);
                tracing::debug!(
                    "Gemini response: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens,
                    usage.completion_tokens
                );
                GenerationResponse::with_usage(text, usage)
            }
            None => GenerationResponse::new(text),
        };

        Ok(response)
    }

    fn get_current_model(&self) -> Result<String> {
        Ok(self.config.model.clone())
    }
}
