//! Capability layer for registering tools and dispatching model tool calls.

mod args;
mod context;
mod error;
mod hooks;
mod registry;
mod tool;

pub mod prelude {
    pub use crate::{
        FunctionTool, NoopToolRuntimeHooks, RunContext, Tool, ToolDescriptor, ToolError,
        ToolErrorKind, ToolFuture, ToolRegistry, ToolRuntimeHooks,
    };
}

pub use args::{
    optional_bool, parse_json_object, parse_json_value, required_bool, required_i64,
    required_string,
};
pub use context::RunContext;
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use tool::{FunctionTool, Tool, ToolDescriptor, ToolFuture};
