//! Local Ollama server through its OpenAI-compatible endpoint.

use std::sync::Arc;

use reqwest::Client;

use crate::adapters::openai::{BearerToken, ChatRequest, ChatTransport, HttpChatTransport};
use crate::{ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderFuture, ProviderId};

pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
pub const OLLAMA_DEFAULT_MODEL: &str = "mistral";

// Ollama ignores the bearer token but the endpoint still expects one.
const PLACEHOLDER_TOKEN: &str = "ollama-local";

#[derive(Clone)]
pub struct OllamaProvider {
    transport: Arc<dyn ChatTransport>,
}

impl OllamaProvider {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    pub fn from_base_url(base_url: impl Into<String>) -> Self {
        let transport = Self::default_http_transport(Client::new()).with_base_url(base_url);
        Self::new(Arc::new(transport))
    }

    pub fn default_http_transport(client: Client) -> HttpChatTransport {
        HttpChatTransport::new(client).with_base_url(OLLAMA_BASE_URL)
    }
}

impl ModelProvider for OllamaProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Ollama
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let reply = self
                .transport
                .send(ChatRequest::from(request), BearerToken::new(PLACEHOLDER_TOKEN))
                .await?;

            Ok(reply.into_model_response(ProviderId::Ollama))
        })
    }
}
