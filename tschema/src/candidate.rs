//! Extraction of a JSON candidate from free-form model text.

use serde_json::Value;

use crate::{SchemaViolation, SchemaViolations};

/// Parses a candidate answer out of assistant text.
///
/// Accepts bare JSON, a fenced code block, or the outermost `{...}` span
/// embedded in prose, in that order.
///
/// ```rust
/// use tschema::parse_candidate;
///
/// let value = parse_candidate("Sure!\n```json\n{\"risk\": 1}\n```").expect("fenced json");
/// assert_eq!(value["risk"], 1);
///
/// assert!(parse_candidate("no json here").is_err());
/// ```
pub fn parse_candidate(text: &str) -> Result<Value, SchemaViolations> {
    let trimmed = text.trim();

    let direct_error = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    if let Some(fenced) = fenced_block(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(fenced)
    {
        return Ok(value);
    }

    if let Some(span) = object_span(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(span)
    {
        return Ok(value);
    }

    Err(SchemaViolations::single(SchemaViolation::InvalidJson {
        reason: direct_error.to_string(),
    }))
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
