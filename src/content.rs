//! Conversions from arbitrary response content values to transcript text.

use serde_json::Value;

/// Placeholder used when completion content cannot be serialized.
pub const UNPARSEABLE_CONTENT: &str = "Error parsing response";

/// Renders a structured value as a fenced JSON code block.
#[must_use]
pub fn json_markdown(value: &Value) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => format!("```json\n{pretty}\n```"),
        Err(_) => format!("```\n{value}\n```"),
    }
}

/// Text used for the authoritative overwrite on run completion.
#[must_use]
pub fn completion_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| UNPARSEABLE_CONTENT.to_string()),
    }
}

/// Normalizes stored message content to plain transcript text.
///
/// Lists of content blocks keep only `text` blocks, joined by single spaces.
#[must_use]
pub fn normalize_content(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(blocks)) => blocks
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        Some(other) => json_markdown(other),
    }
}
