//! Provider construction for facade consumers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tobserve::{SafeProviderHooks, TracingObservabilityHooks};

use crate::{ModelProvider, ProviderError, ProviderId, ProviderOperationHooks, RetryPolicy};

#[derive(Debug, Clone)]
pub struct ProviderBuildConfig {
    pub provider_id: ProviderId,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub retry_policy: RetryPolicy,
}

impl ProviderBuildConfig {
    pub fn new(provider_id: ProviderId) -> Self {
        Self {
            provider_id,
            base_url: None,
            api_key: None,
            timeout: Duration::from_secs(90),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Local Ollama server with its default endpoint.
    pub fn ollama() -> Self {
        Self::new(ProviderId::Ollama)
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new(ProviderId::OpenAi).with_api_key(api_key)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }
}

/// Builds a provider whose transient failures are retried and traced.
pub fn build_provider(config: ProviderBuildConfig) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    build_provider_with_hooks(
        config,
        Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)),
    )
}

pub fn build_provider_with_hooks(
    config: ProviderBuildConfig,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    if config.timeout.is_zero() {
        return Err(ProviderError::invalid_request(
            "provider timeout must be greater than zero",
        ));
    }

    let http = Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;

    match config.provider_id {
        ProviderId::OpenAi => build_openai_provider(config, http, hooks),
        ProviderId::Ollama => build_ollama_provider(config, http, hooks),
    }
}

#[cfg(feature = "provider-openai")]
fn build_openai_provider(
    config: ProviderBuildConfig,
    http: Client,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    use tprovider::adapters::openai::{HttpChatTransport, OpenAiProvider};

    let api_key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ProviderError::authentication("provider API key must not be empty"))?;

    let mut transport = HttpChatTransport::new(http);
    if let Some(base_url) = config.base_url {
        transport = transport.with_base_url(base_url);
    }

    let provider = OpenAiProvider::new(Arc::new(transport)).with_api_key(api_key)?;
    Ok(Arc::new(
        tprovider::RetryingProvider::new(provider, config.retry_policy).with_hooks(hooks),
    ))
}

#[cfg(not(feature = "provider-openai"))]
fn build_openai_provider(
    _config: ProviderBuildConfig,
    _http: Client,
    _hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-openai feature is not enabled on tether",
    ))
}

#[cfg(feature = "provider-ollama")]
fn build_ollama_provider(
    config: ProviderBuildConfig,
    http: Client,
    hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    use tprovider::adapters::ollama::OllamaProvider;

    let mut transport = OllamaProvider::default_http_transport(http);
    if let Some(base_url) = config.base_url {
        transport = transport.with_base_url(base_url);
    }

    let provider = OllamaProvider::new(Arc::new(transport));
    Ok(Arc::new(
        tprovider::RetryingProvider::new(provider, config.retry_policy).with_hooks(hooks),
    ))
}

#[cfg(not(feature = "provider-ollama"))]
fn build_ollama_provider(
    _config: ProviderBuildConfig,
    _http: Client,
    _hooks: Arc<dyn ProviderOperationHooks>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-ollama feature is not enabled on tether",
    ))
}
