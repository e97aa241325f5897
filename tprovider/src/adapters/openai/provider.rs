use std::sync::Arc;

use crate::{ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderFuture, ProviderId};

use super::transport::ChatTransport;
use super::types::{BearerToken, ChatRequest};

/// OpenAI chat-completions provider authenticated with an API key.
#[derive(Clone)]
pub struct OpenAiProvider {
    transport: Arc<dyn ChatTransport>,
    api_key: Option<BearerToken>,
}

impl OpenAiProvider {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            api_key: None,
        }
    }

    /// Keys are expected to start with `sk-`.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if !api_key.starts_with("sk-") {
            return Err(ProviderError::authentication("API key must start with 'sk-'"));
        }

        self.api_key = Some(BearerToken::new(api_key));
        Ok(self)
    }
}

impl ModelProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let token = self
                .api_key
                .clone()
                .ok_or_else(|| ProviderError::authentication("no API key configured"))?;

            let reply = self
                .transport
                .send(ChatRequest::from(request), token)
                .await?;
            Ok(reply.into_model_response(ProviderId::OpenAi))
        })
    }
}
