//! Common imports for most tether applications.

pub use crate::{
    Agent, AgentBuilder, AgentError, AgentErrorKind, AgentPolicy, AgentRuntimeHooks, BoxFuture,
    CancellationToken, FieldSpec, FieldType, ModelProvider, ObjectSchema, OutputMode,
    PromptError, PromptFragment, ProviderBuildConfig, ProviderError, ProviderId, RunContext,
    RunOutcome, StructuredOutput, Tool, ToolDescriptor, ToolError, ToolFuture, Transcript, Turn,
    build_provider, parse_provider_id,
};
