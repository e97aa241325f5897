//! OpenAI-compatible chat-completions adapter (non-streaming).

mod provider;
mod transport;
mod types;
mod wire;

pub use provider::OpenAiProvider;
pub use transport::{ChatTransport, HttpChatTransport, OPENAI_BASE_URL};
pub use types::{BearerToken, ChatReply, ChatRequest, FinishReason};
