//! Model gateway
//!
//! A narrow adapter between the conversation session and the AI provider.
//! The gateway owns a single provider handle that is created lazily on first
//! use and reused afterwards. A failed initialization is not cached, so every
//! later call tries again. All provider failures are translated into
//! `ScholiaError::Generation`; nothing is retried.

use crate::attachments::{Attachment, AttachmentStore};
use crate::config::ProviderConfig;
use crate::error::{Result, ScholiaError};
use crate::providers::{create_provider, GenerationRequest, InlineData, Provider};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Builds a provider from configuration
type ProviderFactory = dyn Fn(&ProviderConfig) -> Result<Arc<dyn Provider>> + Send + Sync;

/// Lazily-initialized access to the configured provider
pub struct ModelGateway {
    config: Mutex<ProviderConfig>,
    handle: Mutex<Option<Arc<dyn Provider>>>,
    factory: Box<ProviderFactory>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ModelGateway {
    /// Create a gateway that builds providers with [`create_provider`]
    ///
    /// No provider is built (and no API key is read) until the first call.
    ///
    /// # Examples
    ///
    /// ```
    /// use scholia::config::ProviderConfig;
    /// use scholia::gateway::ModelGateway;
    ///
    /// let gateway = ModelGateway::new(ProviderConfig::default());
    /// assert!(!gateway.is_initialized());
    /// ```
    pub fn new(config: ProviderConfig) -> Self {
        Self::with_factory(config, |config| create_provider(config).map(Arc::from))
    }

    /// Create a gateway with a custom provider factory
    pub fn with_factory<F>(config: ProviderConfig, factory: F) -> Self
    where
        F: Fn(&ProviderConfig) -> Result<Arc<dyn Provider>> + Send + Sync + 'static,
    {
        Self {
            config: Mutex::new(config),
            handle: Mutex::new(None),
            factory: Box::new(factory),
        }
    }

    /// Create a gateway around an existing provider
    pub fn with_provider(provider: Arc<dyn Provider>) -> Self {
        Self::with_factory(ProviderConfig::default(), move |_| Ok(Arc::clone(&provider)))
    }

    /// Returns the provider handle, building it on first use
    ///
    /// # Errors
    ///
    /// Returns `ScholiaError::Configuration` when the provider cannot be
    /// built (typically a missing API key). The failure is not cached.
    pub fn initialize(&self) -> std::result::Result<Arc<dyn Provider>, ScholiaError> {
        let mut handle = lock(&self.handle);
        if let Some(provider) = handle.as_ref() {
            return Ok(Arc::clone(provider));
        }

        let config = lock(&self.config).clone();
        match (self.factory)(&config) {
            Ok(provider) => {
                tracing::info!("Model gateway initialized ({})", config.provider_type);
                *handle = Some(Arc::clone(&provider));
                Ok(provider)
            }
            Err(e) => {
                tracing::error!("AI initialization error: {:#}", e);
                Err(match e.downcast::<ScholiaError>() {
                    Ok(ScholiaError::Configuration(detail)) => ScholiaError::Configuration(detail),
                    Ok(other) => ScholiaError::Configuration(other.to_string()),
                    Err(e) => ScholiaError::Configuration(format!("{:#}", e)),
                })
            }
        }
    }

    /// Returns true once a provider handle has been built
    pub fn is_initialized(&self) -> bool {
        lock(&self.handle).is_some()
    }

    /// Replace the provider configuration
    ///
    /// The cached handle is dropped only when the configuration actually
    /// changes; the next call rebuilds it.
    pub fn reconfigure(&self, config: ProviderConfig) {
        {
            let mut current = lock(&self.config);
            if *current == config {
                return;
            }
            *current = config;
        }
        *lock(&self.handle) = None;
        tracing::info!("Model gateway reconfigured; provider will be rebuilt on next use");
    }

    /// Generate text for a prompt and optional image attachments
    ///
    /// All attachments go into a single request, before the prompt text.
    ///
    /// # Errors
    ///
    /// - `ScholiaError::InvalidRequest` if the prompt is blank and there are
    ///   no attachments
    /// - `ScholiaError::Configuration` if the provider cannot be built
    /// - `ScholiaError::Generation` for any failure of the call itself
    pub async fn generate(
        &self,
        prompt: &str,
        attachments: &[Attachment],
    ) -> std::result::Result<String, ScholiaError> {
        if prompt.trim().is_empty() && attachments.is_empty() {
            return Err(ScholiaError::InvalidRequest(
                "a prompt or at least one attachment is required".to_string(),
            ));
        }

        let provider = self.initialize()?;

        let request = attachments
            .iter()
            .fold(GenerationRequest::text(prompt), |request, attachment| {
                request.with_inline_data(InlineData::new(
                    attachment.mime_type(),
                    AttachmentStore::encode(attachment),
                ))
            });

        match provider.generate(&request).await {
            Ok(response) => Ok(response.text),
            Err(e) => {
                tracing::error!("Message processing error: {:#}", e);
                Err(match e.downcast::<ScholiaError>() {
                    Ok(ScholiaError::Generation(detail)) => ScholiaError::Generation(detail),
                    Ok(other) => ScholiaError::Generation(other.to_string()),
                    Err(e) => ScholiaError::Generation(format!("{:#}", e)),
                })
            }
        }
    }
}
