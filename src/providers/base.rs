//! Base provider trait and common types for Scholia
//!
//! This module defines the Provider trait that all AI providers must implement,
//! along with the request and response types exchanged with it. A provider is
//! an opaque text-in/text-out function: one request, one text result.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Binary content sent inline with a request
///
/// Carries already-encoded (base64) data together with its declared media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineData {
    /// Declared media type, e.g. `image/png`
    pub mime_type: String,
    /// Base64-encoded payload
    pub data: String,
}

impl InlineData {
    /// Creates a new inline payload
    ///
    /// # Examples
    ///
    /// ```
    /// use scholia::providers::InlineData;
    ///
    /// let part = InlineData::new("image/png", "iVBORw0KGgo=");
    /// assert_eq!(part.mime_type, "image/png");
    /// ```
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// A single generation request
///
/// Inline payloads are sent before the prompt text, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Prompt text
    pub prompt: String,
    /// Inline binary parts (images)
    pub inline_data: Vec<InlineData>,
}

impl GenerationRequest {
    /// Creates a text-only request
    ///
    /// # Examples
    ///
    /// ```
    /// use scholia::providers::GenerationRequest;
    ///
    /// let request = GenerationRequest::text("What is a norm?");
    /// assert_eq!(request.prompt, "What is a norm?");
    /// assert!(request.inline_data.is_empty());
    /// ```
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            inline_data: Vec::new(),
        }
    }

    /// Adds an inline part and returns self for builder pattern
    ///
    /// # Examples
    ///
    /// ```
    /// use scholia::providers::{GenerationRequest, InlineData};
    ///
    /// let request = GenerationRequest::text("Describe this")
    ///     .with_inline_data(InlineData::new("image/jpeg", "AAAA"));
    /// assert_eq!(request.inline_data.len(), 1);
    /// ```
    pub fn with_inline_data(mut self, part: InlineData) -> Self {
        self.inline_data.push(part);
        self
    }
}

/// Token usage information from a generation
///
/// Tracks the number of tokens used in prompts and completions,
/// as reported by the AI provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use scholia::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Response from a generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The model's text output, unmodified
    pub text: String,
    /// Token usage, when the provider reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl GenerationResponse {
    /// Create a response without usage information
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    /// Create a response with usage information
    pub fn with_usage(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage: Some(usage),
        }
    }
}

/// Provider trait for AI generation services
///
/// Implementations perform exactly one attempt per call and report any
/// failure as an error; retries and user-facing messaging are the caller's
/// concern.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generates text for a single request
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response is invalid
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Get the name of the currently active model
    ///
    /// # Default Implementation
    ///
    /// The default implementation returns a generic unavailable message.
    fn get_current_model(&self) -> Result<String> {
        Err(crate::error::ScholiaError::Configuration(
            "Current model information is not available from this provider".to_string(),
        )
        .into())
    }
}
