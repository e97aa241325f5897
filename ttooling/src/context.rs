//! Per-call view of the run handed to tool handlers.

use tcommon::RunId;

/// Borrowed dependency context plus the identifiers of the current call.
///
/// The runtime never mutates `deps`; handlers that need side effects get
/// them through whatever the dependency type holds.
pub struct RunContext<'a, D> {
    pub deps: &'a D,
    pub run_id: RunId,
    pub tool_call_id: String,
    /// Corrective retries consumed so far in this run.
    pub retry: u32,
}

impl<'a, D> RunContext<'a, D> {
    pub fn new(deps: &'a D, run_id: RunId) -> Self {
        Self {
            deps,
            run_id,
            tool_call_id: String::new(),
            retry: 0,
        }
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = tool_call_id.into();
        self
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }
}

impl<D> Clone for RunContext<'_, D> {
    fn clone(&self) -> Self {
        Self {
            deps: self.deps,
            run_id: self.run_id.clone(),
            tool_call_id: self.tool_call_id.clone(),
            retry: self.retry,
        }
    }
}

impl<D> std::fmt::Debug for RunContext<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("run_id", &self.run_id)
            .field("tool_call_id", &self.tool_call_id)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
