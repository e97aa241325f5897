//! Tool registration and dispatch errors.

use tschema::SchemaViolations;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// The model asked for a tool that is not registered.
    NotFound,
    DuplicateTool,
    InvalidArguments,
    Execution,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}{}: {message}", describe_call(.tool_name, .tool_call_id))]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub tool_name: Option<String>,
    pub tool_call_id: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            tool_name: None,
            tool_call_id: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message)
    }

    pub fn duplicate(name: &str) -> Self {
        Self::new(
            ToolErrorKind::DuplicateTool,
            format!("tool `{name}` is already registered"),
        )
        .with_tool_name(name)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Other, message)
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }

    /// Errors the model caused and can fix by reissuing the call.
    pub fn is_corrective(&self) -> bool {
        matches!(
            self.kind,
            ToolErrorKind::NotFound | ToolErrorKind::InvalidArguments
        )
    }
}

impl From<SchemaViolations> for ToolError {
    fn from(value: SchemaViolations) -> Self {
        Self::invalid_arguments(format!("arguments failed validation:\n{}", value.to_bullets()))
    }
}

fn describe_call(tool_name: &Option<String>, tool_call_id: &Option<String>) -> String {
    match (tool_name, tool_call_id) {
        (Some(tool_name), Some(tool_call_id)) => {
            format!(" [tool={tool_name}, call_id={tool_call_id}]")
        }
        (Some(tool_name), None) => format!(" [tool={tool_name}]"),
        _ => String::new(),
    }
}
