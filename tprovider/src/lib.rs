//! Model capability boundary: request/response types, the provider trait,
//! infrastructure retries, and HTTP adapters.

mod error;
mod model;
mod provider;
mod resilience;

pub mod adapters;
pub mod prelude;

pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    Message, ModelRequest, ModelRequestBuilder, ModelResponse, OutputItem, ProviderId, Role,
    StopReason, TokenUsage, ToolCall, ToolDefinition,
};
pub use provider::{ModelProvider, ProviderFuture};
pub use resilience::{
    NoopOperationHooks, ProviderOperationHooks, RetryPolicy, RetryingProvider, execute_with_retry,
};
