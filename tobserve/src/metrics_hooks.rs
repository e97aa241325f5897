//! `metrics` counters and histograms for model calls, tool dispatch, and
//! the run lifecycle.
//!
//! ```rust
//! use tobserve::MetricsObservabilityHooks;
//! use tprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use serde_json::Value;
use tagent::{AgentError, AgentRuntimeHooks};
use tcommon::RunId;
use tprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ttooling::{ToolError, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

// Model calls are the only provider operation the agent loop makes, so the
// provider series are named after them and labelled by outcome rather than by
// operation.
fn model_call_outcome(provider: ProviderId, outcome: &'static str, attempts: u32) {
    metrics::counter!(
        "tether_model_call_total",
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "tether_model_call_attempts",
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .record(f64::from(attempts));
}

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, _operation: &str, attempt: u32) {
        let kind = if attempt == 1 { "first" } else { "retry" };
        metrics::counter!(
            "tether_model_call_attempt_total",
            "provider" => provider.to_string(),
            "attempt" => kind
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        _operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "tether_model_call_transient_error_total",
            "provider" => provider.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("tether_model_call_backoff_seconds", "provider" => provider.to_string())
            .record(delay.as_secs_f64());
    }

    fn on_success(&self, provider: ProviderId, _operation: &str, attempts: u32) {
        model_call_outcome(provider, "ok", attempts);
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        _operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        // Surfaces to the agent as a model-unavailable run failure.
        model_call_outcome(provider, "unavailable", attempts);
        metrics::counter!(
            "tether_model_call_error_total",
            "provider" => provider.to_string(),
            "error_kind" => format!("{:?}", error.kind),
            "retryable" => if error.retryable { "true" } else { "false" }
        )
        .increment(1);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, _run_id: &RunId, tool_call: &ToolCall) {
        metrics::counter!(
            "tether_tool_execution_start_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        _run_id: &RunId,
        tool_call: &ToolCall,
        _output: &Value,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "tether_tool_execution_success_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "tether_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        _run_id: &RunId,
        tool_call: &ToolCall,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "tether_tool_execution_failure_total",
            "tool_name" => tool_call.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "tether_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl AgentRuntimeHooks for MetricsObservabilityHooks {
    fn on_run_start(&self, _run_id: &RunId, _query: &str) {
        metrics::counter!("tether_agent_run_start_total").increment(1);
    }

    fn on_prompt_built(&self, _run_id: &RunId, prompt_chars: usize, elapsed: Duration) {
        metrics::histogram!("tether_agent_prompt_chars").record(prompt_chars as f64);
        metrics::histogram!("tether_agent_prompt_build_seconds").record(elapsed.as_secs_f64());
    }

    fn on_model_request(&self, _run_id: &RunId, _request_number: u32) {
        metrics::counter!("tether_agent_model_request_total").increment(1);
    }

    fn on_tool_dispatched(&self, _run_id: &RunId, tool_call: &ToolCall, is_error: bool) {
        metrics::counter!(
            "tether_agent_tool_dispatched_total",
            "tool_name" => tool_call.name.clone(),
            "status" => if is_error { "error" } else { "ok" }
        )
        .increment(1);
    }

    fn on_corrective_retry(&self, _run_id: &RunId, _retry: u32, _reason: &str) {
        metrics::counter!("tether_agent_corrective_retry_total").increment(1);
    }

    fn on_run_success(&self, _run_id: &RunId, model_requests: u32, elapsed: Duration) {
        metrics::counter!("tether_agent_run_success_total").increment(1);
        metrics::histogram!("tether_agent_model_requests_per_run", "status" => "success")
            .record(model_requests as f64);
        metrics::histogram!("tether_agent_run_duration_seconds", "status" => "success")
            .record(elapsed.as_secs_f64());
    }

    fn on_run_failure(&self, _run_id: &RunId, error: &AgentError, elapsed: Duration) {
        metrics::counter!(
            "tether_agent_run_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("tether_agent_run_duration_seconds", "status" => "failure")
            .record(elapsed.as_secs_f64());
    }
}
