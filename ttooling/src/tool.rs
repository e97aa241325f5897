//! Tool trait contract for registry-managed capabilities.
//!
//! ```rust
//! use tschema::{FieldSpec, ObjectSchema};
//! use ttooling::{FunctionTool, Tool, ToolDescriptor};
//!
//! let tool = FunctionTool::<()>::new(
//!     ToolDescriptor::new(
//!         "echo",
//!         "Echoes the text argument",
//!         ObjectSchema::new().field(FieldSpec::string("text")),
//!     ),
//!     |_ctx, args| Box::pin(async move { Ok(args["text"].clone()) }),
//! );
//!
//! assert_eq!(tool.descriptor().name, "echo");
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};
use tcommon::BoxFuture;
use tprovider::ToolDefinition;
use tschema::ObjectSchema;

use crate::{RunContext, ToolError};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// Name, description, and argument shape of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: ObjectSchema,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ObjectSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Catalog entry sent to the model.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.parameters.to_json_schema().to_string(),
        }
    }
}

pub trait Tool<D>: Send + Sync {
    fn descriptor(&self) -> &ToolDescriptor;

    /// Runs the tool with arguments that already passed the descriptor's
    /// parameter schema.
    fn invoke<'a>(
        &'a self,
        context: RunContext<'a, D>,
        args: Map<String, Value>,
    ) -> ToolFuture<'a, Result<Value, ToolError>>;
}

type ToolHandler<D> = dyn for<'a> Fn(RunContext<'a, D>, Map<String, Value>) -> ToolFuture<'a, Result<Value, ToolError>>
    + Send
    + Sync;

pub struct FunctionTool<D> {
    descriptor: ToolDescriptor,
    handler: Arc<ToolHandler<D>>,
}

impl<D> FunctionTool<D> {
    pub fn new<F>(descriptor: ToolDescriptor, handler: F) -> Self
    where
        F: for<'a> Fn(RunContext<'a, D>, Map<String, Value>) -> ToolFuture<'a, Result<Value, ToolError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            descriptor,
            handler: Arc::new(handler),
        }
    }
}

impl<D> Tool<D> for FunctionTool<D>
where
    D: Send + Sync,
{
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn invoke<'a>(
        &'a self,
        context: RunContext<'a, D>,
        args: Map<String, Value>,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        (self.handler)(context, args)
    }
}
