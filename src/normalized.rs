//! Flattening of upstream message content into plain text.
//!
//! Thread messages carry their content as a list of typed parts (text,
//! image files, image URLs, ...). The browser only renders text, so each
//! message is reduced to a single string before it is returned:
//!
//! - a list of parts becomes the `text.value` of every `"text"` part,
//!   joined by a single space; other part types are skipped,
//! - a plain string is passed through unchanged,
//! - anything else is rendered as its JSON text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::openai::{MessageRole, ThreadMessage};

/// A thread message as the browser sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub role: MessageRole,
    pub content: String,
}

impl From<&ThreadMessage> for NormalizedMessage {
    fn from(msg: &ThreadMessage) -> Self {
        Self {
            role: msg.role,
            content: normalize_content(&msg.content),
        }
    }
}

/// Reduce raw message content to a flat string.
#[must_use]
pub fn normalize_content(content: &Value) -> String {
    match content {
        Value::Array(parts) => parts
            .iter()
            .filter_map(text_part_value)
            .collect::<Vec<_>>()
            .join(" "),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_part_value(part: &Value) -> Option<&str> {
    if part.get("type").and_then(Value::as_str) != Some("text") {
        return None;
    }
    part.get("text")
        .and_then(|t| t.get("value"))
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
}
