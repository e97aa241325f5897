//! Small parsing helpers for configuration surfaces.

use crate::ProviderId;

pub fn parse_provider_id(value: &str) -> Option<ProviderId> {
    match value.trim().to_ascii_lowercase().as_str() {
        "openai" => Some(ProviderId::OpenAi),
        "ollama" | "local" => Some(ProviderId::Ollama),
        _ => None,
    }
}
