//! Runtime hook contracts for observing agent runs.
//!
//! ```rust
//! use tagent::{AgentRuntimeHooks, NoopAgentRuntimeHooks};
//!
//! fn accepts_hooks(_hooks: &dyn AgentRuntimeHooks) {}
//!
//! let hooks = NoopAgentRuntimeHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use tcommon::RunId;
use tprovider::ToolCall;

use crate::AgentError;

pub trait AgentRuntimeHooks: Send + Sync {
    fn on_run_start(&self, _run_id: &RunId, _query: &str) {}

    fn on_prompt_built(&self, _run_id: &RunId, _prompt_chars: usize, _elapsed: Duration) {}

    fn on_model_request(&self, _run_id: &RunId, _request_number: u32) {}

    fn on_tool_dispatched(&self, _run_id: &RunId, _tool_call: &ToolCall, _is_error: bool) {}

    fn on_corrective_retry(&self, _run_id: &RunId, _retry: u32, _reason: &str) {}

    fn on_run_success(&self, _run_id: &RunId, _model_requests: u32, _elapsed: Duration) {}

    fn on_run_failure(&self, _run_id: &RunId, _error: &AgentError, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAgentRuntimeHooks;

impl AgentRuntimeHooks for NoopAgentRuntimeHooks {}
