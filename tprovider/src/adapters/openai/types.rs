//! Chat-completions exchange types shared by the OpenAI and Ollama providers.

use std::fmt::Formatter;

use crate::{
    Message, ModelRequest, ModelResponse, OutputItem, ProviderId, StopReason, TokenUsage, ToolCall,
    ToolDefinition,
};

/// A chat-completions call in terms of the shared model types.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl From<ModelRequest> for ChatRequest {
    fn from(request: ModelRequest) -> Self {
        Self {
            model: request.model,
            messages: request.messages,
            tools: request.tools,
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
        }
    }
}

/// The first choice of a chat-completions reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub model: String,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: FinishReason,
    pub usage: TokenUsage,
}

impl ChatReply {
    pub(crate) fn into_model_response(self, provider: ProviderId) -> ModelResponse {
        let text = (!self.content.is_empty())
            .then(|| OutputItem::Message(Message::assistant(self.content)));
        let output = text
            .into_iter()
            .chain(self.tool_calls.into_iter().map(OutputItem::ToolCall))
            .collect();

        ModelResponse {
            provider,
            model: self.model,
            output,
            stop_reason: self.finish_reason.into(),
            usage: self.usage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    Cancelled,
    Other,
}

impl FinishReason {
    pub(crate) fn parse(value: Option<&str>) -> Self {
        match value {
            Some("stop") => Self::Stop,
            Some("length") => Self::Length,
            Some("tool_calls") | Some("function_call") => Self::ToolCalls,
            Some("cancelled") => Self::Cancelled,
            _ => Self::Other,
        }
    }
}

impl From<FinishReason> for StopReason {
    fn from(value: FinishReason) -> Self {
        match value {
            FinishReason::Stop => Self::EndTurn,
            FinishReason::Length => Self::MaxTokens,
            FinishReason::ToolCalls => Self::ToolUse,
            FinishReason::Cancelled => Self::Cancelled,
            FinishReason::Other => Self::Other,
        }
    }
}

/// Bearer credential sent with each request. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}
