//! Parsing utilities for model replies.
//!
//! Providers asked for JSON normally return a bare JSON document, but
//! OpenAI-compatible servers without schema support tend to wrap it in a
//! markdown fence or a sentence. These helpers locate the JSON document;
//! they never relax the schema check that follows.

use crate::error::Result;
use crate::WorkflowError;
use serde_json::Value;

/// Extract JSON content from markdown fenced code blocks.
///
/// Recognizes `` ```json ``, `` ```JSON ``, and plain `` ``` `` fences.
pub fn extract_json_block(text: &str) -> Option<String> {
    let markers = ["```json", "```JSON", "```"];
    for marker in markers {
        if let Some(start) = text.find(marker) {
            let content_start = start + marker.len();
            if let Some(end) = text[content_start..].find("```") {
                return Some(text[content_start..content_start + end].trim().to_string());
            }
        }
    }
    None
}

/// Try to locate and extract a JSON object or array from text that may
/// contain surrounding prose.
///
/// Tries, in order:
/// 1. Markdown code block extraction
/// 2. First `{` or `[` with matching closer
pub fn extract_json_candidate(text: &str) -> Option<String> {
    let trimmed = text.trim();

    if let Some(block) = extract_json_block(trimmed) {
        return Some(block);
    }

    let idx = trimmed.find('{').or_else(|| trimmed.find('['))?;
    let candidate = &trimmed[idx..];
    if serde_json::from_str::<Value>(candidate).is_ok() {
        return Some(candidate.to_string());
    }
    let close = if candidate.starts_with('{') { '}' } else { ']' };
    let end = candidate.rfind(close)?;
    let substr = &candidate[..=end];
    serde_json::from_str::<Value>(substr)
        .ok()
        .map(|_| substr.to_string())
}

/// Parse a model reply into a `serde_json::Value`, requiring valid JSON.
///
/// Tries a direct parse first, then [`extract_json_candidate`].
pub fn parse_value_defensively(text: &str) -> Result<Value> {
    let trimmed = text.trim();

    if let Ok(val) = serde_json::from_str::<Value>(trimmed) {
        return Ok(val);
    }

    if let Some(candidate) = extract_json_candidate(trimmed) {
        if let Ok(val) = serde_json::from_str::<Value>(&candidate) {
            return Ok(val);
        }
    }

    Err(WorkflowError::Other(format!(
        "No valid JSON found in model reply. Raw text (truncated): {}",
        truncate(trimmed, 200)
    )))
}

/// Truncate on a char boundary.
pub(crate) fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
