//! Tool registry: registration by unique name and validated dispatch.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use tcommon::Registry;
use tprovider::{ToolCall, ToolDefinition};

use crate::{
    FunctionTool, NoopToolRuntimeHooks, RunContext, Tool, ToolDescriptor, ToolError,
    ToolErrorKind, ToolFuture, ToolRuntimeHooks, parse_json_object,
};

pub struct ToolRegistry<D> {
    tools: Registry<String, Arc<dyn Tool<D>>>,
}

impl<D> Default for ToolRegistry<D> {
    fn default() -> Self {
        Self {
            tools: Registry::new(),
        }
    }
}

impl<D> ToolRegistry<D>
where
    D: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tool` under its descriptor name. Never overwrites.
    pub fn register<T>(&mut self, tool: T) -> Result<(), ToolError>
    where
        T: Tool<D> + 'static,
    {
        let name = tool.descriptor().name.clone();
        if name.trim().is_empty() {
            return Err(ToolError::other("tool name must not be empty"));
        }

        self.tools
            .try_insert(name.clone(), Arc::new(tool))
            .map_err(|_| ToolError::duplicate(&name))
    }

    pub fn register_fn<F>(&mut self, descriptor: ToolDescriptor, handler: F) -> Result<(), ToolError>
    where
        F: for<'a> Fn(RunContext<'a, D>, Map<String, Value>) -> ToolFuture<'a, Result<Value, ToolError>>
            + Send
            + Sync
            + 'static,
    {
        self.register(FunctionTool::new(descriptor, handler))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Tool catalog for the model, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| tool.descriptor().definition())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn dispatch(
        &self,
        call: &ToolCall,
        context: RunContext<'_, D>,
    ) -> Result<Value, ToolError> {
        self.dispatch_with_hooks(call, context, &NoopToolRuntimeHooks)
            .await
    }

    /// Looks up, validates, and invokes one tool call. The handler runs at
    /// most once; nothing is retried here.
    pub async fn dispatch_with_hooks(
        &self,
        call: &ToolCall,
        context: RunContext<'_, D>,
        hooks: &dyn ToolRuntimeHooks,
    ) -> Result<Value, ToolError> {
        let run_id = context.run_id.clone();
        hooks.on_execution_start(&run_id, call);
        let started = Instant::now();

        let result = self
            .dispatch_unobserved(call, context)
            .await
            .map_err(|error| {
                error
                    .with_tool_name(call.name.clone())
                    .with_tool_call_id(call.id.clone())
            });

        match &result {
            Ok(output) => hooks.on_execution_success(&run_id, call, output, started.elapsed()),
            Err(error) => hooks.on_execution_failure(&run_id, call, error, started.elapsed()),
        }

        result
    }

    async fn dispatch_unobserved(
        &self,
        call: &ToolCall,
        context: RunContext<'_, D>,
    ) -> Result<Value, ToolError> {
        let Some(tool) = self.tools.get(call.name.as_str()) else {
            return Err(ToolError::not_found(format!(
                "unknown tool `{}`; available tools: {}",
                call.name,
                self.names().join(", ")
            )));
        };

        let args = parse_json_object(&call.arguments)?;
        let args = tool.descriptor().parameters.validate(&Value::Object(args))?;
        let context = context.with_tool_call_id(call.id.clone());

        tool.invoke(context, args).await.map_err(|error| match error.kind {
            ToolErrorKind::InvalidArguments | ToolErrorKind::Execution => error,
            _ => ToolError {
                kind: ToolErrorKind::Execution,
                ..error
            },
        })
    }
}
