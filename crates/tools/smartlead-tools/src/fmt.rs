//! Text responses for tool calls.
//!
//! A success renders as the tool title, an optional summary line and the
//! pretty-printed payload. A failure renders the normalized error and sets
//! `isError`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;
use crate::tool::ToolSpec;

/// One block of response content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Plain text
    Text {
        /// The text
        text: String,
    },
}

impl Content {
    /// Text content
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The text of this block
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text { text } => text,
        }
    }
}

/// Response of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Content blocks
    pub content: Vec<Content>,
    /// Whether the call failed
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl ToolResponse {
    /// All text blocks joined by newlines
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(Content::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Pretty JSON, falling back to compact JSON.
pub fn pretty_json(v: &Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

/// Formats a successful payload.
#[must_use]
pub fn format_success(spec: &ToolSpec, payload: &Value) -> ToolResponse {
    let mut text = String::from(spec.title);
    if let Some(line) = spec.summary.render(payload) {
        text.push('\n');
        text.push_str(&line);
    }
    text.push_str("\n\n");
    text.push_str(&pretty_json(payload));
    ToolResponse {
        content: vec![Content::text(text)],
        is_error: false,
    }
}

/// Formats a failure.
#[must_use]
pub fn format_error(err: &ToolError) -> ToolResponse {
    let n = err.normalized();
    let mut text = format!("Error ({})", n.kind);
    if let Some(status) = n.status {
        text.push_str(&format!(" HTTP {status}"));
    }
    text.push_str(": ");
    text.push_str(&n.message);
    if let Some(field) = &n.field {
        text.push_str(&format!("\nField: {field}"));
    }
    if let Some(cause) = &n.cause {
        text.push_str(&format!("\nCause: {cause}"));
    }
    ToolResponse {
        content: vec![Content::text(text)],
        is_error: true,
    }
}
