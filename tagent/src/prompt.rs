//! System prompt assembly from static instructions and context fragments.
//!
//! ```rust
//! use tagent::{PromptAssembler, PromptError};
//!
//! struct Customer {
//!     name: String,
//! }
//!
//! let assembler = PromptAssembler::<Customer>::new("You are a support agent in our bank.")
//!     .fragment_fn(|customer| {
//!         Box::pin(async move { Ok::<_, PromptError>(format!("The customer's name is {:?}", customer.name)) })
//!     });
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime should build");
//! let prompt = runtime
//!     .block_on(assembler.build_system_prompt(&Customer { name: "John".to_string() }))
//!     .expect("prompt should build");
//!
//! assert_eq!(prompt, "You are a support agent in our bank.\n\nThe customer's name is \"John\"");
//! ```

use std::fmt::Display;
use std::sync::Arc;

use tcommon::BoxFuture;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("prompt fragment failed: {message}")]
pub struct PromptError {
    pub message: String,
}

impl PromptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn from_error(error: impl Display) -> Self {
        Self::new(error.to_string())
    }
}

/// Produces one piece of the system prompt from the dependency context.
pub trait PromptFragment<D>: Send + Sync {
    fn render<'a>(&'a self, deps: &'a D) -> BoxFuture<'a, Result<String, PromptError>>;
}

type FragmentFn<D> =
    dyn for<'a> Fn(&'a D) -> BoxFuture<'a, Result<String, PromptError>> + Send + Sync;

pub struct FnFragment<D> {
    render: Arc<FragmentFn<D>>,
}

impl<D> FnFragment<D> {
    pub fn new<F>(render: F) -> Self
    where
        F: for<'a> Fn(&'a D) -> BoxFuture<'a, Result<String, PromptError>> + Send + Sync + 'static,
    {
        Self {
            render: Arc::new(render),
        }
    }
}

impl<D> PromptFragment<D> for FnFragment<D> {
    fn render<'a>(&'a self, deps: &'a D) -> BoxFuture<'a, Result<String, PromptError>> {
        (self.render)(deps)
    }
}

pub struct PromptAssembler<D> {
    instructions: String,
    fragments: Vec<Arc<dyn PromptFragment<D>>>,
}

impl<D> PromptAssembler<D>
where
    D: Send + Sync + 'static,
{
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            fragments: Vec::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn fragment<F>(mut self, fragment: F) -> Self
    where
        F: PromptFragment<D> + 'static,
    {
        self.push_fragment(fragment);
        self
    }

    pub fn fragment_fn<F>(self, render: F) -> Self
    where
        F: for<'a> Fn(&'a D) -> BoxFuture<'a, Result<String, PromptError>> + Send + Sync + 'static,
    {
        self.fragment(FnFragment::new(render))
    }

    pub fn push_fragment<F>(&mut self, fragment: F)
    where
        F: PromptFragment<D> + 'static,
    {
        self.fragments.push(Arc::new(fragment));
    }

    /// Instructions followed by each fragment in registration order, joined
    /// by a blank line. Blank fragments are skipped; the first failure stops
    /// assembly.
    pub async fn build_system_prompt(&self, deps: &D) -> Result<String, PromptError> {
        let mut sections = Vec::with_capacity(self.fragments.len() + 1);
        if !self.instructions.trim().is_empty() {
            sections.push(self.instructions.trim().to_string());
        }

        for fragment in &self.fragments {
            let rendered = fragment.render(deps).await?;
            let rendered = rendered.trim();
            if !rendered.is_empty() {
                sections.push(rendered.to_string());
            }
        }

        Ok(sections.join("\n\n"))
    }
}
