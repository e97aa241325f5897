//! Append-only conversation transcript for one run.
//!
//! ```rust
//! use tagent::{Transcript, Turn};
//!
//! let mut transcript = Transcript::new();
//! transcript.push(Turn::SystemPrompt("You are a support agent in our bank.".to_string()));
//! transcript.push(Turn::UserPrompt("What is my balance?".to_string()));
//!
//! assert_eq!(transcript.len(), 2);
//! assert_eq!(transcript.to_messages().len(), 2);
//! ```

use std::fmt::{Display, Formatter};

use tprovider::{Message, ToolCall};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    SystemPrompt(String),
    UserPrompt(String),
    /// Assistant response requesting tool calls, with any text it carried.
    ToolCalls {
        text: String,
        calls: Vec<ToolCall>,
    },
    ToolResult {
        call_id: String,
        name: String,
        content: String,
        is_error: bool,
    },
    CandidateAnswer(String),
    /// Validation feedback sent back to the model as a user message.
    Corrective(String),
}

impl Turn {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SystemPrompt(_) => "system",
            Self::UserPrompt(_) => "user",
            Self::ToolCalls { .. } => "tool-calls",
            Self::ToolResult { .. } => "tool-result",
            Self::CandidateAnswer(_) => "answer",
            Self::Corrective(_) => "corrective",
        }
    }

    pub fn to_message(&self) -> Message {
        match self {
            Self::SystemPrompt(content) => Message::system(content.clone()),
            Self::UserPrompt(content) | Self::Corrective(content) => Message::user(content.clone()),
            Self::ToolCalls { text, calls } => Message::assistant_tool_calls(text.clone(), calls.clone()),
            Self::ToolResult {
                call_id, content, ..
            } => Message::tool_result(call_id.clone(), content.clone()),
            Self::CandidateAnswer(content) => Message::assistant(content.clone()),
        }
    }
}

impl Display for Turn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolCalls { text, calls } => {
                write!(f, "[{}]", self.label())?;
                if !text.is_empty() {
                    write!(f, " {text}")?;
                }
                for call in calls {
                    write!(f, " {}({})#{}", call.name, call.arguments, call.id)?;
                }
                Ok(())
            }
            Self::ToolResult {
                call_id,
                name,
                content,
                is_error,
            } => {
                let status = if *is_error { "error" } else { "ok" };
                write!(f, "[{}] {name}#{call_id} {status}: {content}", self.label())
            }
            Self::SystemPrompt(content)
            | Self::UserPrompt(content)
            | Self::CandidateAnswer(content)
            | Self::Corrective(content) => write!(f, "[{}] {content}", self.label()),
        }
    }
}

/// Ordered record of a run. Turns can be appended and read, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Provider messages for the next model request, in turn order.
    pub fn to_messages(&self) -> Vec<Message> {
        self.turns.iter().map(Turn::to_message).collect()
    }
}

impl Display for Transcript {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, turn) in self.turns.iter().enumerate() {
            writeln!(f, "{index:>3} {turn}")?;
        }
        Ok(())
    }
}
