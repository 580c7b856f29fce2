//! Wire format of the Responses and Models endpoints

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How talkative the model should be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[default]
    Low,
    Medium,
    High,
}

/// Requested output format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextFormat {
    Text,
    JsonObject,
}

/// The `text` block of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOptions {
    pub verbosity: Verbosity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<TextFormat>,
}

/// Body of `POST /v1/responses`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub instructions: String,
    pub input: String,
    pub text: TextOptions,
}

/// A prompt as the caller describes it; the credential travels separately
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub model: String,
    pub instructions: String,
    pub input: String,
    pub verbosity: Verbosity,
    /// Per-request timeout; `None` uses the client default for the call
    pub timeout: Option<Duration>,
}

impl PromptRequest {
    pub fn new(
        model: impl Into<String>,
        instructions: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            instructions: instructions.into(),
            input: input.into(),
            verbosity: Verbosity::default(),
            timeout: None,
        }
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the wire body, optionally asking for a specific format
    pub fn to_wire(&self, format: Option<TextFormat>) -> ResponsesRequest {
        ResponsesRequest {
            model: self.model.clone(),
            instructions: self.instructions.clone(),
            input: self.input.clone(),
            text: TextOptions {
                verbosity: self.verbosity,
                format,
            },
        }
    }
}

/// Body of a Responses reply; only the parts we read
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsesReply {
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

/// One entry of `output[]` (messages, reasoning, tool calls, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

/// One fragment of a message's content
#[derive(Debug, Clone, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Body of `GET /v1/models`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    #[serde(default)]
    pub id: Option<String>,
}

impl ModelList {
    /// Non-empty model identifiers in listing order
    pub fn ids(self) -> Vec<String> {
        self.data
            .into_iter()
            .filter_map(|m| m.id)
            .filter(|id| !id.is_empty())
            .collect()
    }
}
