//! Wire types for the OpenAI Responses API — only the fields this crate
//! sends and reads, nothing more.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct ResponsesRequest {
    pub model: String,
    pub input: Vec<InputMessage>,
    pub text: TextConfig,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub store: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct InputMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TextConfig {
    pub format: TextFormat,
}

#[derive(Debug, Serialize)]
pub(crate) struct TextFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'static str,
    pub schema: Value,
    pub strict: bool,
}

impl TextFormat {
    pub(crate) fn json_schema(name: &'static str, schema: Value) -> Self {
        Self {
            kind: "json_schema",
            name,
            schema,
            strict: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsesReply {
    #[serde(default)]
    pub output_text: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Extract the model's output text. Prefers the convenience `output_text`
/// field, then scans `output` for the first `message` / `output_text` part.
/// Falls back to `"{}"` so downstream parsing fails closed instead of
/// erroring.
pub(crate) fn output_text(reply: &ResponsesReply) -> String {
    if let Some(text) = &reply.output_text {
        return text.clone();
    }
    for item in &reply.output {
        if item.kind.as_deref() != Some("message") {
            continue;
        }
        for part in &item.content {
            if part.kind.as_deref() == Some("output_text") {
                if let Some(text) = &part.text {
                    return text.clone();
                }
            }
        }
    }
    "{}".to_string()
}
