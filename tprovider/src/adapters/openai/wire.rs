//! JSON bodies of `POST /chat/completions`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Message, ProviderError, Role, TokenUsage, ToolCall, ToolDefinition};

use super::types::{ChatReply, ChatRequest, FinishReason};

const FUNCTION: &str = "function";

#[derive(Debug, Serialize)]
pub(crate) struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

impl TryFrom<ChatRequest> for WireRequest {
    type Error = ProviderError;

    fn try_from(request: ChatRequest) -> Result<Self, Self::Error> {
        if request.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "chat completion request requires at least one message",
            ));
        }

        Ok(Self {
            model: request.model,
            messages: request
                .messages
                .into_iter()
                .map(WireMessage::try_from)
                .collect::<Result<_, _>>()?,
            tools: request
                .tools
                .into_iter()
                .map(WireTool::try_from)
                .collect::<Result<_, _>>()?,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        })
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl TryFrom<Message> for WireMessage {
    type Error = ProviderError;

    fn try_from(message: Message) -> Result<Self, Self::Error> {
        match message.role {
            Role::Tool if message.tool_call_id.is_none() => {
                return Err(ProviderError::invalid_request(
                    "tool messages must reference a tool call id",
                ));
            }
            Role::System | Role::User if message.content.trim().is_empty() => {
                return Err(ProviderError::invalid_request(
                    "message content must not be empty",
                ));
            }
            _ => {}
        }

        Ok(Self {
            role: role_name(message.role),
            content: message.content,
            tool_calls: message.tool_calls.into_iter().map(WireToolCall::from).collect(),
            tool_call_id: message.tool_call_id,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

fn function_kind() -> String {
    FUNCTION.to_string()
}

impl From<ToolCall> for WireToolCall {
    fn from(call: ToolCall) -> Self {
        Self {
            id: call.id,
            kind: function_kind(),
            function: WireFunctionCall {
                name: call.name,
                arguments: call.arguments,
            },
        }
    }
}

impl From<WireToolCall> for ToolCall {
    fn from(call: WireToolCall) -> Self {
        Self {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionSpec,
}

impl TryFrom<ToolDefinition> for WireTool {
    type Error = ProviderError;

    fn try_from(tool: ToolDefinition) -> Result<Self, Self::Error> {
        let parameters = serde_json::from_str::<Value>(&tool.input_schema).map_err(|_| {
            ProviderError::invalid_request(format!(
                "tool `{}` schema must be valid JSON",
                tool.name
            ))
        })?;

        Ok(Self {
            kind: FUNCTION,
            function: WireFunctionSpec {
                name: tool.name,
                description: tool.description,
                parameters,
            },
        })
    }
}

#[derive(Debug, Serialize)]
struct WireFunctionSpec {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireResponse {
    model: String,
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireReplyMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl TryFrom<WireResponse> for ChatReply {
    type Error = ProviderError;

    fn try_from(response: WireResponse) -> Result<Self, Self::Error> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::transport("chat completion response had no choices"))?;

        Ok(Self {
            model: response.model,
            content: choice.message.content.unwrap_or_default(),
            tool_calls: choice
                .message
                .tool_calls
                .into_iter()
                .map(ToolCall::from)
                .collect(),
            finish_reason: FinishReason::parse(choice.finish_reason.as_deref()),
            usage: TokenUsage {
                input_tokens: response.usage.prompt_tokens,
                output_tokens: response.usage.completion_tokens,
                total_tokens: response.usage.total_tokens,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireErrorEnvelope {
    error: WireErrorBody,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    message: String,
}

/// Message of an `{"error": {"message": ...}}` body, if the body has one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<WireErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}
