//! Thin client for the OpenAI Responses API
//!
//! Provides the HTTP client ([`ResponsesClient`]), the typed wire format,
//! text extraction from `output[]` messages, and the [`ModelResolver`]
//! which caches the list of available models for a number of hours.
//!
//! The voice generator talks to the endpoint only through the
//! [`TextGenerationBackend`] trait so other backends (or test doubles)
//! can stand in.

mod client;
mod error;
mod extract;
mod resolver;
mod types;

pub use client::{ClientConfig, ResponsesClient, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
pub use extract::{extract_first_json_object, extract_response_text, parse_json_object};
pub use resolver::{ModelResolver, DEFAULT_CACHE_HOURS};
pub use types::{
    ContentPart, ModelEntry, ModelList, OutputItem, PromptRequest, ResponsesReply,
    ResponsesRequest, TextFormat, TextOptions, Verbosity,
};

use async_trait::async_trait;

/// A remote service that can list models and answer prompts
#[async_trait]
pub trait TextGenerationBackend: Send + Sync {
    /// Identifiers of all models the credential may use
    async fn list_models(&self, api_key: &str) -> ClientResult<Vec<String>>;

    /// Answer a prompt with plain text
    async fn respond_text(&self, api_key: &str, request: &PromptRequest) -> ClientResult<String>;

    /// Answer a prompt with a single JSON object
    ///
    /// `Ok(None)` means the reply contained no text at all.
    async fn respond_json_object(
        &self,
        api_key: &str,
        request: &PromptRequest,
    ) -> ClientResult<Option<serde_json::Value>>;
}
