//! Common `tprovider` imports for downstream crates.

pub use crate::{
    Message, ModelProvider, ModelRequest, ModelRequestBuilder, ModelResponse, NoopOperationHooks,
    OutputItem, ProviderError, ProviderErrorKind, ProviderFuture, ProviderId,
    ProviderOperationHooks, RetryPolicy, RetryingProvider, Role, StopReason, TokenUsage, ToolCall,
    ToolDefinition, execute_with_retry,
};
pub use tcommon::{BoxFuture, MetadataMap};
