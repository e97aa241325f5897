//! Wrappers that keep a panicking hook from taking a run down with it.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use serde_json::Value;
use tagent::{AgentError, AgentRuntimeHooks};
use tcommon::RunId;
use tprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ttooling::{ToolError, ToolRuntimeHooks};

pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(provider, operation, attempt)
        }));
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_retry_scheduled(provider, operation, attempt, delay, error)
        }));
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(provider, operation, attempts)
        }));
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(provider, operation, attempts, error)
        }));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, run_id: &RunId, tool_call: &ToolCall) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(run_id, tool_call)
        }));
    }

    fn on_execution_success(
        &self,
        run_id: &RunId,
        tool_call: &ToolCall,
        output: &Value,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(run_id, tool_call, output, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        run_id: &RunId,
        tool_call: &ToolCall,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(run_id, tool_call, error, elapsed)
        }));
    }
}

pub struct SafeAgentHooks<H> {
    inner: H,
}

impl<H> SafeAgentHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> AgentRuntimeHooks for SafeAgentHooks<H>
where
    H: AgentRuntimeHooks,
{
    fn on_run_start(&self, run_id: &RunId, query: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_run_start(run_id, query)));
    }

    fn on_prompt_built(&self, run_id: &RunId, prompt_chars: usize, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_prompt_built(run_id, prompt_chars, elapsed)
        }));
    }

    fn on_model_request(&self, run_id: &RunId, request_number: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_model_request(run_id, request_number)
        }));
    }

    fn on_tool_dispatched(&self, run_id: &RunId, tool_call: &ToolCall, is_error: bool) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_tool_dispatched(run_id, tool_call, is_error)
        }));
    }

    fn on_corrective_retry(&self, run_id: &RunId, retry: u32, reason: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_corrective_retry(run_id, retry, reason)
        }));
    }

    fn on_run_success(&self, run_id: &RunId, model_requests: u32, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_run_success(run_id, model_requests, elapsed)
        }));
    }

    fn on_run_failure(&self, run_id: &RunId, error: &AgentError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_run_failure(run_id, error, elapsed)
        }));
    }
}
