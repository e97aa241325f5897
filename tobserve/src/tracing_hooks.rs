//! Structured `tracing` events for provider attempts, tool dispatch, and run
//! lifecycle.
//!
//! ```rust
//! use tagent::AgentRuntimeHooks;
//! use tobserve::TracingObservabilityHooks;
//!
//! fn accepts_agent_hooks(_hooks: &dyn AgentRuntimeHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_agent_hooks(&hooks);
//! ```

use std::time::Duration;

use serde_json::Value;
use tagent::{AgentError, AgentRuntimeHooks};
use tcommon::RunId;
use tprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ttooling::{ToolError, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        tracing::debug!(
            phase = "provider",
            event = "attempt_start",
            provider = %provider,
            operation,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "provider",
            event = "retry_scheduled",
            provider = %provider,
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        tracing::debug!(
            phase = "provider",
            event = "success",
            provider = %provider,
            operation,
            attempts
        );
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            provider = %provider,
            operation,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, run_id: &RunId, tool_call: &ToolCall) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            run_id = %run_id,
            tool_name = tool_call.name,
            tool_call_id = tool_call.id
        );
    }

    fn on_execution_success(
        &self,
        run_id: &RunId,
        tool_call: &ToolCall,
        _output: &Value,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            run_id = %run_id,
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        run_id: &RunId,
        tool_call: &ToolCall,
        error: &ToolError,
        elapsed: Duration,
    ) {
        if error.is_corrective() {
            tracing::warn!(
                phase = "tool",
                event = "execution_rejected",
                run_id = %run_id,
                tool_name = tool_call.name,
                tool_call_id = tool_call.id,
                error_kind = ?error.kind,
                error = %error
            );
        } else {
            tracing::error!(
                phase = "tool",
                event = "execution_failure",
                run_id = %run_id,
                tool_name = tool_call.name,
                tool_call_id = tool_call.id,
                elapsed_ms = elapsed.as_millis() as u64,
                error_kind = ?error.kind,
                error = %error
            );
        }
    }
}

impl AgentRuntimeHooks for TracingObservabilityHooks {
    fn on_run_start(&self, run_id: &RunId, query: &str) {
        tracing::info!(
            phase = "agent",
            event = "run_start",
            run_id = %run_id,
            query_chars = query.chars().count()
        );
    }

    fn on_prompt_built(&self, run_id: &RunId, prompt_chars: usize, elapsed: Duration) {
        tracing::debug!(
            phase = "agent",
            event = "prompt_built",
            run_id = %run_id,
            prompt_chars,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_model_request(&self, run_id: &RunId, request_number: u32) {
        tracing::debug!(
            phase = "agent",
            event = "model_request",
            run_id = %run_id,
            request_number
        );
    }

    fn on_tool_dispatched(&self, run_id: &RunId, tool_call: &ToolCall, is_error: bool) {
        tracing::debug!(
            phase = "agent",
            event = "tool_dispatched",
            run_id = %run_id,
            tool_name = tool_call.name,
            is_error
        );
    }

    fn on_corrective_retry(&self, run_id: &RunId, retry: u32, reason: &str) {
        tracing::warn!(
            phase = "agent",
            event = "corrective_retry",
            run_id = %run_id,
            retry,
            reason
        );
    }

    fn on_run_success(&self, run_id: &RunId, model_requests: u32, elapsed: Duration) {
        tracing::info!(
            phase = "agent",
            event = "run_success",
            run_id = %run_id,
            model_requests,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_run_failure(&self, run_id: &RunId, error: &AgentError, elapsed: Duration) {
        tracing::error!(
            phase = "agent",
            event = "run_failure",
            run_id = %run_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            transcript_turns = error.transcript.len(),
            error = %error
        );
    }
}
