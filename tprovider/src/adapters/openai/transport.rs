//! Chat-completions transport trait and its reqwest implementation.

use reqwest::{Client, Response, StatusCode};

use crate::{ProviderError, ProviderFuture};

use super::types::{BearerToken, ChatReply, ChatRequest};
use super::wire::{WireRequest, WireResponse, error_message};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Sends one chat-completions request. Providers talk to the network only
/// through this trait, so tests can substitute a fake.
pub trait ChatTransport: Send + Sync + std::fmt::Debug {
    fn send<'a>(
        &'a self,
        request: ChatRequest,
        token: BearerToken,
    ) -> ProviderFuture<'a, Result<ChatReply, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    client: Client,
    base_url: String,
}

impl HttpChatTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn classify_send_error(error: reqwest::Error) -> ProviderError {
    let message = error.to_string();
    if error.is_timeout() {
        ProviderError::timeout(message)
    } else if error.is_connect() {
        ProviderError::unavailable(message)
    } else {
        ProviderError::transport(message)
    }
}

async fn status_error(response: Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| format!("chat completion request failed with status {status}"));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::timeout(message),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            ProviderError::unavailable(message)
        }
        status if status.is_client_error() => ProviderError::invalid_request(message),
        _ => ProviderError::transport(message),
    }
}

impl ChatTransport for HttpChatTransport {
    fn send<'a>(
        &'a self,
        request: ChatRequest,
        token: BearerToken,
    ) -> ProviderFuture<'a, Result<ChatReply, ProviderError>> {
        Box::pin(async move {
            let body = WireRequest::try_from(request)?;
            let response = self
                .client
                .post(self.completions_url())
                .bearer_auth(token.expose())
                .json(&body)
                .send()
                .await
                .map_err(classify_send_error)?;

            if !response.status().is_success() {
                return Err(status_error(response).await);
            }

            let parsed: WireResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            ChatReply::try_from(parsed)
        })
    }
}
