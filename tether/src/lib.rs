//! Unified facade over the tether workspace crates.
//!
//! Most applications only need this crate: it re-exports the agent runtime,
//! schemas, tooling, providers, and observability hooks, and adds provider
//! construction helpers.
//!
//! ```rust,no_run
//! use serde::Deserialize;
//! use tether::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! struct CityLocation {
//!     city: String,
//!     country: String,
//! }
//!
//! impl StructuredOutput for CityLocation {
//!     fn schema() -> ObjectSchema {
//!         ObjectSchema::new()
//!             .field(FieldSpec::string("city"))
//!             .field(FieldSpec::string("country"))
//!     }
//! }
//!
//! let provider = build_provider(ProviderBuildConfig::ollama()).expect("provider");
//! let agent = Agent::<(), CityLocation>::builder(provider, AgentPolicy::new("mistral"))
//!     .build()
//!     .expect("agent");
//!
//! let outcome = agent
//!     .run_and_wait("Where were the olympics held in 2012?", &())
//!     .expect("run");
//! println!("{}, {}", outcome.output.city, outcome.output.country);
//! ```

mod providers;

pub mod prelude;
pub mod util;

pub use tagent;
pub use tcommon;
pub use tobserve;
pub use tprovider;
pub use tschema;
pub use ttooling;

pub use tagent::{
    Agent, AgentBuilder, AgentError, AgentErrorKind, AgentPolicy, AgentRuntimeHooks,
    CancellationToken, DEFAULT_MAX_MODEL_REQUESTS, DEFAULT_MAX_RETRIES, FINAL_RESULT_TOOL,
    FnFragment, NoopAgentRuntimeHooks, OutputMode, PromptAssembler, PromptError, PromptFragment,
    RunOutcome, Transcript, Turn,
};
pub use tcommon::{BoxFuture, MetadataMap, RunId};
pub use tobserve::{
    MetricsObservabilityHooks, SafeAgentHooks, SafeProviderHooks, SafeToolHooks,
    TracingObservabilityHooks,
};
pub use tprovider::{
    Message, ModelProvider, ModelRequest, ModelResponse, NoopOperationHooks, OutputItem,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderId, ProviderOperationHooks,
    RetryPolicy, RetryingProvider, Role, StopReason, TokenUsage, ToolCall, ToolDefinition,
};
pub use tschema::{
    FieldSpec, FieldType, ObjectSchema, SchemaViolation, SchemaViolations, StructuredOutput,
};
pub use ttooling::{
    FunctionTool, NoopToolRuntimeHooks, RunContext, Tool, ToolDescriptor, ToolError,
    ToolErrorKind, ToolFuture, ToolRegistry, ToolRuntimeHooks, optional_bool, parse_json_object,
    required_bool, required_i64, required_string,
};

pub use providers::{ProviderBuildConfig, build_provider, build_provider_with_hooks};
pub use util::parse_provider_id;
