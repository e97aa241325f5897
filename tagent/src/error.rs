//! Classified run failures.
//!
//! ```rust
//! use tagent::{AgentError, AgentErrorKind};
//!
//! let err = AgentError::unexpected_model_behavior("exceeded maximum retries (2)");
//! assert_eq!(err.kind, AgentErrorKind::UnexpectedModelBehavior);
//! assert!(err.is_model_fault());
//! assert!(err.to_string().contains("maximum retries"));
//! ```

use tprovider::ProviderError;

use crate::{PromptError, Transcript};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentErrorKind {
    /// A prompt fragment could not be resolved from the dependency context.
    ContextResolution,
    ModelUnavailable,
    Cancelled,
    /// The corrective retry budget or the model request cap was exhausted.
    UnexpectedModelBehavior,
    /// The blocking entry point could not drive the run.
    Runtime,
    Configuration,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct AgentError {
    pub kind: AgentErrorKind,
    pub message: String,
    /// Turns recorded before the failure.
    pub transcript: Transcript,
}

impl AgentError {
    pub fn new(kind: AgentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            transcript: Transcript::new(),
        }
    }

    pub fn context_resolution(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::ContextResolution, message)
    }

    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::ModelUnavailable, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Cancelled, message)
    }

    pub fn unexpected_model_behavior(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::UnexpectedModelBehavior, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Runtime, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Configuration, message)
    }

    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = transcript;
        self
    }

    /// Whether running the same query again could plausibly succeed.
    pub fn is_retryable_by_caller(&self) -> bool {
        matches!(
            self.kind,
            AgentErrorKind::ModelUnavailable | AgentErrorKind::UnexpectedModelBehavior
        )
    }

    pub fn is_model_fault(&self) -> bool {
        self.kind == AgentErrorKind::UnexpectedModelBehavior
    }
}

impl From<ProviderError> for AgentError {
    fn from(value: ProviderError) -> Self {
        Self::model_unavailable(value.to_string())
    }
}

impl From<PromptError> for AgentError {
    fn from(value: PromptError) -> Self {
        Self::context_resolution(value.to_string())
    }
}
