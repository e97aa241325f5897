//! Typed agent runtime: prompt assembly, tool dispatch, result validation,
//! and bounded corrective retries.

mod agent;
mod error;
mod hooks;
mod policy;
mod prompt;
mod transcript;

pub use agent::{Agent, AgentBuilder, FINAL_RESULT_TOOL, RunOutcome};
pub use error::{AgentError, AgentErrorKind};
pub use hooks::{AgentRuntimeHooks, NoopAgentRuntimeHooks};
pub use policy::{AgentPolicy, DEFAULT_MAX_MODEL_REQUESTS, DEFAULT_MAX_RETRIES, OutputMode};
pub use prompt::{FnFragment, PromptAssembler, PromptError, PromptFragment};
pub use transcript::{Transcript, Turn};

pub use tokio_util::sync::CancellationToken;
pub use ttooling::RunContext;

pub mod prelude {
    pub use crate::{
        Agent, AgentBuilder, AgentError, AgentErrorKind, AgentPolicy, AgentRuntimeHooks,
        CancellationToken, NoopAgentRuntimeHooks, OutputMode, PromptError, PromptFragment,
        RunContext, RunOutcome, Transcript, Turn,
    };
}
