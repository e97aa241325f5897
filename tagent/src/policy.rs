//! Run policy: model selection, generation options, and retry bounds.
//!
//! ```rust
//! use tagent::{AgentPolicy, OutputMode};
//!
//! let policy = AgentPolicy::new("mistral")
//!     .with_max_retries(2)
//!     .with_output_mode(OutputMode::Text);
//!
//! assert!(policy.validate().is_ok());
//! assert!(AgentPolicy::new("  ").validate().is_err());
//! ```

use tcommon::GenerationOptions;

use crate::AgentError;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_MODEL_REQUESTS: u32 = 25;

/// How the model is expected to deliver its final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Through a `final_result` tool whose arguments are the result schema.
    /// Plain JSON text answers are still accepted.
    #[default]
    Tool,
    /// As JSON in the assistant text.
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentPolicy {
    pub model: String,
    /// Corrective retries allowed per run.
    pub max_retries: u32,
    /// Hard cap on model round-trips per run, tool calls included.
    pub max_model_requests: u32,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub output_mode: OutputMode,
}

impl AgentPolicy {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            max_model_requests: DEFAULT_MAX_MODEL_REQUESTS,
            temperature: None,
            max_tokens: None,
            output_mode: OutputMode::default(),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_max_model_requests(mut self, max_model_requests: u32) -> Self {
        self.max_model_requests = max_model_requests;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        if self.model.trim().is_empty() {
            return Err(AgentError::configuration("model must not be empty"));
        }

        if self.max_model_requests == 0 {
            return Err(AgentError::configuration(
                "max_model_requests must be greater than zero",
            ));
        }

        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(AgentError::configuration(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        if self.max_tokens == Some(0) {
            return Err(AgentError::configuration(
                "max_tokens must be greater than zero",
            ));
        }

        Ok(())
    }
}
