//! Runtime hooks for tool dispatch lifecycle events.
//!
//! ```rust
//! use ttooling::{NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = NoopToolRuntimeHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use serde_json::Value;
use tcommon::RunId;
use tprovider::ToolCall;

use crate::ToolError;

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_execution_start(&self, _run_id: &RunId, _tool_call: &ToolCall) {}

    fn on_execution_success(
        &self,
        _run_id: &RunId,
        _tool_call: &ToolCall,
        _output: &Value,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _run_id: &RunId,
        _tool_call: &ToolCall,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
