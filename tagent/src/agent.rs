//! Agent construction and the run loop.
//!
//! A run walks `prompting -> awaiting model -> dispatching tools | validating
//! result` until a candidate validates or a terminal failure is reached.
//! Model mistakes (unknown tools, bad arguments, invalid answers) are fed
//! back into the transcript and draw on a bounded retry budget.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use tcommon::{BoxFuture, RunId};
use tokio_util::sync::CancellationToken;
use tprovider::{ModelProvider, ModelRequest, OutputItem, Role, ToolCall, ToolDefinition};
use tschema::{ObjectSchema, SchemaViolations, StructuredOutput, decode, parse_candidate};
use ttooling::{
    NoopToolRuntimeHooks, RunContext, Tool, ToolDescriptor, ToolError, ToolFuture, ToolRegistry,
    ToolRuntimeHooks,
};

use crate::{
    AgentError, AgentPolicy, AgentRuntimeHooks, NoopAgentRuntimeHooks, OutputMode,
    PromptAssembler, PromptError, PromptFragment, Transcript, Turn,
};

/// Name of the tool through which the model submits its answer in
/// [`OutputMode::Tool`].
pub const FINAL_RESULT_TOOL: &str = "final_result";

const FINAL_RESULT_DESCRIPTION: &str = "The final response which ends this conversation";

/// A validated result together with the record of how it was produced.
#[derive(Debug, Clone)]
pub struct RunOutcome<O> {
    pub output: O,
    pub run_id: RunId,
    pub transcript: Transcript,
    pub model_requests: u32,
    pub retries_used: u32,
}

struct AgentInner<D> {
    provider: Arc<dyn ModelProvider>,
    policy: AgentPolicy,
    assembler: PromptAssembler<D>,
    tools: ToolRegistry<D>,
    result_schema: ObjectSchema,
    catalog: Vec<ToolDefinition>,
    hooks: Arc<dyn AgentRuntimeHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
}

/// An immutable, shareable agent producing results of type `O` from
/// dependency contexts of type `D`.
pub struct Agent<D, O> {
    inner: Arc<AgentInner<D>>,
    output: PhantomData<fn() -> O>,
}

impl<D, O> Clone for Agent<D, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            output: PhantomData,
        }
    }
}

impl<D, O> std::fmt::Debug for Agent<D, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tools: Vec<&str> = self
            .inner
            .catalog
            .iter()
            .map(|definition| definition.name.as_str())
            .collect();

        f.debug_struct("Agent")
            .field("policy", &self.inner.policy)
            .field("tools", &tools)
            .finish_non_exhaustive()
    }
}

pub struct AgentBuilder<D, O> {
    provider: Arc<dyn ModelProvider>,
    policy: AgentPolicy,
    assembler: PromptAssembler<D>,
    tools: ToolRegistry<D>,
    registration_errors: Vec<ToolError>,
    hooks: Arc<dyn AgentRuntimeHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
    output: PhantomData<fn() -> O>,
}

impl<D, O> AgentBuilder<D, O>
where
    D: Send + Sync + 'static,
    O: StructuredOutput,
{
    pub fn new(provider: Arc<dyn ModelProvider>, policy: AgentPolicy) -> Self {
        Self {
            provider,
            policy,
            assembler: PromptAssembler::new(""),
            tools: ToolRegistry::new(),
            registration_errors: Vec::new(),
            hooks: Arc::new(NoopAgentRuntimeHooks),
            tool_hooks: Arc::new(NoopToolRuntimeHooks),
            output: PhantomData,
        }
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.assembler = self.assembler.with_instructions(instructions);
        self
    }

    pub fn fragment<F>(mut self, fragment: F) -> Self
    where
        F: PromptFragment<D> + 'static,
    {
        self.assembler.push_fragment(fragment);
        self
    }

    pub fn fragment_fn<F>(mut self, render: F) -> Self
    where
        F: for<'a> Fn(&'a D) -> BoxFuture<'a, Result<String, PromptError>> + Send + Sync + 'static,
    {
        self.assembler = self.assembler.fragment_fn(render);
        self
    }

    /// Registers a tool. Duplicate names are reported by [`Self::build`].
    pub fn tool<T>(mut self, tool: T) -> Self
    where
        T: Tool<D> + 'static,
    {
        if let Err(error) = self.tools.register(tool) {
            self.registration_errors.push(error);
        }
        self
    }

    pub fn tool_fn<F>(mut self, descriptor: ToolDescriptor, handler: F) -> Self
    where
        F: for<'a> Fn(RunContext<'a, D>, Map<String, Value>) -> ToolFuture<'a, Result<Value, ToolError>>
            + Send
            + Sync
            + 'static,
    {
        if let Err(error) = self.tools.register_fn(descriptor, handler) {
            self.registration_errors.push(error);
        }
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn AgentRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn tool_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = hooks;
        self
    }

    pub fn build(self) -> Result<Agent<D, O>, AgentError> {
        self.policy.validate()?;

        if let Some(error) = self.registration_errors.first() {
            return Err(AgentError::configuration(error.to_string()));
        }

        let result_schema = O::schema();
        let mut catalog = self.tools.definitions();
        if self.policy.output_mode == OutputMode::Tool {
            if self.tools.contains(FINAL_RESULT_TOOL) {
                return Err(AgentError::configuration(format!(
                    "tool name `{FINAL_RESULT_TOOL}` is reserved for the final result"
                )));
            }

            let final_result = ToolDescriptor::new(
                FINAL_RESULT_TOOL,
                FINAL_RESULT_DESCRIPTION,
                result_schema.clone(),
            );
            catalog.push(final_result.definition());
        }

        Ok(Agent {
            inner: Arc::new(AgentInner {
                provider: self.provider,
                policy: self.policy,
                assembler: self.assembler,
                tools: self.tools,
                result_schema,
                catalog,
                hooks: self.hooks,
                tool_hooks: self.tool_hooks,
            }),
            output: PhantomData,
        })
    }
}

struct RunState {
    run_id: RunId,
    transcript: Transcript,
    model_requests: u32,
    retries_used: u32,
}

impl<D, O> Agent<D, O>
where
    D: Send + Sync + 'static,
    O: StructuredOutput,
{
    pub fn builder(provider: Arc<dyn ModelProvider>, policy: AgentPolicy) -> AgentBuilder<D, O> {
        AgentBuilder::new(provider, policy)
    }

    pub fn policy(&self) -> &AgentPolicy {
        &self.inner.policy
    }

    pub fn result_schema(&self) -> &ObjectSchema {
        &self.inner.result_schema
    }

    /// Tool catalog sent with every model request.
    pub fn tool_catalog(&self) -> &[ToolDefinition] {
        &self.inner.catalog
    }

    pub async fn system_prompt(&self, deps: &D) -> Result<String, AgentError> {
        Ok(self.inner.assembler.build_system_prompt(deps).await?)
    }

    pub async fn run(
        &self,
        query: impl Into<String>,
        deps: &D,
    ) -> Result<RunOutcome<O>, AgentError> {
        self.run_with_cancellation(query, deps, CancellationToken::new())
            .await
    }

    /// Drives a run to completion on a private current-thread runtime.
    ///
    /// Fails with [`crate::AgentErrorKind::Runtime`] when called from inside
    /// an async runtime or when the runtime cannot start.
    pub fn run_and_wait(
        &self,
        query: impl Into<String>,
        deps: &D,
    ) -> Result<RunOutcome<O>, AgentError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(AgentError::runtime(
                "run_and_wait cannot block inside an async runtime; await run instead",
            ));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| AgentError::runtime(format!("failed to start runtime: {err}")))?;

        runtime.block_on(self.run(query, deps))
    }

    pub async fn run_with_cancellation(
        &self,
        query: impl Into<String>,
        deps: &D,
        cancel: CancellationToken,
    ) -> Result<RunOutcome<O>, AgentError> {
        let query = query.into();
        let started = Instant::now();
        let hooks = self.inner.hooks.as_ref();
        let mut run = RunState {
            run_id: RunId::generate(),
            transcript: Transcript::new(),
            model_requests: 0,
            retries_used: 0,
        };

        hooks.on_run_start(&run.run_id, &query);
        tracing::debug!(run_id = %run.run_id, phase = "start", "agent run started");

        match self.drive(&mut run, query, deps, &cancel).await {
            Ok(output) => {
                hooks.on_run_success(&run.run_id, run.model_requests, started.elapsed());
                tracing::debug!(
                    run_id = %run.run_id,
                    phase = "done",
                    model_requests = run.model_requests,
                    retries_used = run.retries_used,
                    "agent run succeeded"
                );

                Ok(RunOutcome {
                    output,
                    run_id: run.run_id,
                    transcript: run.transcript,
                    model_requests: run.model_requests,
                    retries_used: run.retries_used,
                })
            }
            Err(error) => {
                let error = error.with_transcript(run.transcript);
                hooks.on_run_failure(&run.run_id, &error, started.elapsed());
                tracing::debug!(
                    run_id = %run.run_id,
                    phase = "failed",
                    error_kind = ?error.kind,
                    "agent run failed"
                );
                Err(error)
            }
        }
    }

    async fn drive(
        &self,
        run: &mut RunState,
        query: String,
        deps: &D,
        cancel: &CancellationToken,
    ) -> Result<O, AgentError> {
        let inner = &*self.inner;

        if query.trim().is_empty() {
            return Err(AgentError::configuration("user query must not be empty"));
        }

        let prompt_started = Instant::now();
        let system_prompt = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(AgentError::cancelled("run cancelled while building the system prompt"));
            }
            prompt = inner.assembler.build_system_prompt(deps) => prompt?,
        };

        inner.hooks.on_prompt_built(
            &run.run_id,
            system_prompt.chars().count(),
            prompt_started.elapsed(),
        );
        // No instructions and no fragment output means no system message at all.
        if !system_prompt.trim().is_empty() {
            run.transcript.push(Turn::SystemPrompt(system_prompt));
        }
        run.transcript.push(Turn::UserPrompt(query));

        loop {
            if run.model_requests >= inner.policy.max_model_requests {
                return Err(AgentError::unexpected_model_behavior(format!(
                    "exceeded the limit of {} model requests",
                    inner.policy.max_model_requests
                )));
            }

            run.model_requests += 1;
            inner.hooks.on_model_request(&run.run_id, run.model_requests);
            tracing::debug!(
                run_id = %run.run_id,
                phase = "awaiting_model",
                request = run.model_requests,
                "requesting model response"
            );

            let request = ModelRequest::builder(inner.policy.model.clone())
                .messages(run.transcript.to_messages())
                .options(inner.policy.generation_options())
                .tools(inner.catalog.clone())
                .metadata("run_id", run.run_id.as_str())
                .build()
                .map_err(|err| AgentError::configuration(err.message))?;

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(AgentError::cancelled("run cancelled while awaiting the model"));
                }
                response = inner.provider.complete(request) => response?,
            };

            let (text, calls) = split_output(response.output);

            // Tool calls win over any text in the same response.
            if !calls.is_empty() {
                tracing::debug!(
                    run_id = %run.run_id,
                    phase = "dispatching_tool",
                    calls = calls.len(),
                    "dispatching tool calls"
                );
                run.transcript.push(Turn::ToolCalls {
                    text,
                    calls: calls.clone(),
                });

                if let Some(output) = self.dispatch_calls(run, deps, cancel, calls).await? {
                    return Ok(output);
                }
                continue;
            }

            tracing::debug!(run_id = %run.run_id, phase = "validating_result", "validating answer");
            run.transcript.push(Turn::CandidateAnswer(text.clone()));
            match self.validate_candidate(&text) {
                Ok(output) => return Ok(output),
                Err(violations) => {
                    self.consume_retry(run, &violations.to_string())?;
                    run.transcript
                        .push(Turn::Corrective(corrective_feedback(&violations)));
                }
            }
        }
    }

    /// Dispatches one response's tool calls in order. Returns the output when
    /// a `final_result` call validated.
    async fn dispatch_calls(
        &self,
        run: &mut RunState,
        deps: &D,
        cancel: &CancellationToken,
        calls: Vec<ToolCall>,
    ) -> Result<Option<O>, AgentError> {
        let inner = &*self.inner;
        let final_result_enabled = inner.policy.output_mode == OutputMode::Tool;
        let is_final = |call: &ToolCall| final_result_enabled && call.name == FINAL_RESULT_TOOL;
        let defer_final = calls.iter().any(|call| !is_final(call));

        let mut accepted = None;
        let mut corrective = Vec::new();

        for call in calls {
            if cancel.is_cancelled() {
                return Err(AgentError::cancelled(format!(
                    "run cancelled before dispatching tool `{}`",
                    call.name
                )));
            }

            let (content, is_error) = if is_final(&call) {
                if defer_final {
                    (
                        format!(
                            "`{FINAL_RESULT_TOOL}` was called together with other tools; call it again once their results are available"
                        ),
                        false,
                    )
                } else if accepted.is_some() {
                    ("A final result was already accepted; this call was ignored".to_string(), false)
                } else {
                    match self.validate_candidate(&call.arguments) {
                        Ok(output) => {
                            accepted = Some(output);
                            ("Final result processed.".to_string(), false)
                        }
                        Err(violations) => {
                            corrective.push(violations.to_string());
                            (corrective_feedback(&violations), true)
                        }
                    }
                }
            } else {
                let context = RunContext::new(deps, run.run_id.clone()).with_retry(run.retries_used);
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return Err(AgentError::cancelled(format!(
                            "run cancelled while tool `{}` was running",
                            call.name
                        )));
                    }
                    result = inner.tools.dispatch_with_hooks(&call, context, inner.tool_hooks.as_ref()) => result,
                };

                match result {
                    Ok(value) => (render_tool_output(&value), false),
                    Err(error) if error.is_corrective() => {
                        corrective.push(error.message.clone());
                        (
                            format!("{}\n\nFix the errors and try again.", error.message),
                            true,
                        )
                    }
                    Err(error) => {
                        tracing::warn!(
                            run_id = %run.run_id,
                            tool = %call.name,
                            error = %error,
                            "tool execution failed"
                        );
                        (format!("tool `{}` failed: {}", call.name, error.message), true)
                    }
                }
            };

            inner.hooks.on_tool_dispatched(&run.run_id, &call, is_error);
            run.transcript.push(Turn::ToolResult {
                call_id: call.id,
                name: call.name,
                content,
                is_error,
            });
        }

        if accepted.is_some() {
            return Ok(accepted);
        }

        if !corrective.is_empty() {
            self.consume_retry(run, &corrective.join("; "))?;
        }

        Ok(None)
    }

    fn validate_candidate(&self, text: &str) -> Result<O, SchemaViolations> {
        parse_candidate(text).and_then(|candidate| decode(&self.inner.result_schema, &candidate))
    }

    fn consume_retry(&self, run: &mut RunState, reason: &str) -> Result<(), AgentError> {
        let max_retries = self.inner.policy.max_retries;
        if run.retries_used >= max_retries {
            return Err(AgentError::unexpected_model_behavior(format!(
                "exceeded maximum retries ({max_retries}): {reason}"
            )));
        }

        run.retries_used += 1;
        self.inner
            .hooks
            .on_corrective_retry(&run.run_id, run.retries_used, reason);
        tracing::debug!(
            run_id = %run.run_id,
            retry = run.retries_used,
            max_retries,
            reason,
            "corrective retry"
        );
        Ok(())
    }
}

fn split_output(items: Vec<OutputItem>) -> (String, Vec<ToolCall>) {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for item in items {
        match item {
            OutputItem::Message(message) => {
                if message.role == Role::Assistant {
                    text.push_str(&message.content);
                }
            }
            OutputItem::ToolCall(call) => tool_calls.push(call),
        }
    }

    (text, tool_calls)
}

fn render_tool_output(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn corrective_feedback(violations: &SchemaViolations) -> String {
    format!(
        "Validation feedback:\n{}\n\nFix the errors and try again.",
        violations.to_bullets()
    )
}
