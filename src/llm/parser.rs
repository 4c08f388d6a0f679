//! Response parsing for LLM outputs.
//!
//! Stages ask the backend for a single JSON object. Models wrap replies in
//! markdown fences or surrounding prose often enough that the parser digs
//! the object out instead of failing on the first stray character.

use crate::error::{Result, ScoutError};
use serde_json::{Map, Value};

/// Extracts a JSON object from an LLM reply.
///
/// Tries, in order: the whole trimmed reply, the contents of a ```json or
/// ``` fence, and the outermost `{...}` span. Anything else is an error
/// carrying the raw reply for diagnostics.
pub fn extract_json_object(response: &str) -> Result<Map<String, Value>> {
    let trimmed = response.trim();

    if let Some(map) = try_parse_object(trimmed) {
        return Ok(map);
    }

    if let Some(inner) = extract_code_block(trimmed) {
        if let Some(map) = try_parse_object(inner.trim()) {
            return Ok(map);
        }
    }

    if let Some(span) = outermost_object_span(trimmed) {
        if let Some(map) = try_parse_object(span) {
            return Ok(map);
        }
    }

    Err(ScoutError::llm(format!(
        "Reply is not a JSON object: {trimmed}"
    )))
}

fn try_parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Extracts the contents of the first markdown code fence, if any.
///
/// Accepts both ```json and bare ``` fences.
fn extract_code_block(text: &str) -> Option<&str> {
    let start_idx = text.find("```")?;
    let after_fence = &text[start_idx + 3..];

    // Skip the language specifier line, if present.
    let content_start = after_fence.find('\n')? + 1;
    let content = &after_fence[content_start..];

    let end_idx = content.find("```")?;
    Some(&content[..end_idx])
}

/// Returns the span from the first `{` to the last `}`, if both exist.
fn outermost_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
