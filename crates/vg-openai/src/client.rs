//! HTTP client for the Responses and Models endpoints

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{ClientError, ClientResult};
use crate::extract::{extract_response_text, parse_json_object};
use crate::types::{ModelList, PromptRequest, ResponsesReply, TextFormat};
use crate::TextGenerationBackend;

/// Public OpenAI API host
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const RESPONSES_PATH: &str = "/v1/responses";
const MODELS_PATH: &str = "/v1/models";

/// Endpoint location and default timeouts
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host, without trailing slash
    pub base_url: String,
    /// Timeout for plain text responses
    pub text_timeout: Duration,
    /// Timeout for JSON-object responses
    pub json_timeout: Duration,
    /// Timeout for listing models
    pub models_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_timeout: Duration::from_millis(8000),
            json_timeout: Duration::from_millis(9000),
            models_timeout: Duration::from_millis(8000),
        }
    }
}

impl ClientConfig {
    /// Point the client at a different host (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Client for the Responses API
#[derive(Clone)]
pub struct ResponsesClient {
    client: Client,
    config: ClientConfig,
}

impl ResponsesClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::builder().build().unwrap_or_default(),
            config,
        }
    }

    /// Get the endpoint configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Send a request and decode a 2xx JSON body
    ///
    /// Non-2xx answers become [`ClientError::HttpStatus`] with the raw body.
    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
        api_key: &str,
        timeout: Duration,
    ) -> ClientResult<T> {
        let response = request
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        let raw_body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Remote endpoint returned an error status");
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body: raw_body,
            });
        }

        Ok(serde_json::from_str(&raw_body)?)
    }

    async fn post_responses(
        &self,
        api_key: &str,
        request: &PromptRequest,
        format: Option<TextFormat>,
        default_timeout: Duration,
    ) -> ClientResult<ResponsesReply> {
        let body = request.to_wire(format);
        let timeout = request.timeout.unwrap_or(default_timeout);
        Self::send_json(
            self.client.post(self.url(RESPONSES_PATH)).json(&body),
            api_key,
            timeout,
        )
        .await
    }
}

#[async_trait]
impl TextGenerationBackend for ResponsesClient {
    #[instrument(skip(self, api_key))]
    async fn list_models(&self, api_key: &str) -> ClientResult<Vec<String>> {
        let list: ModelList = Self::send_json(
            self.client.get(self.url(MODELS_PATH)),
            api_key,
            self.config.models_timeout,
        )
        .await?;

        let ids = list.ids();
        debug!(count = ids.len(), "Listed available models");
        Ok(ids)
    }

    #[instrument(skip(self, api_key, request), fields(model = %request.model))]
    async fn respond_text(&self, api_key: &str, request: &PromptRequest) -> ClientResult<String> {
        let reply = self
            .post_responses(api_key, request, None, self.config.text_timeout)
            .await?;
        Ok(extract_response_text(&reply))
    }

    #[instrument(skip(self, api_key, request), fields(model = %request.model))]
    async fn respond_json_object(
        &self,
        api_key: &str,
        request: &PromptRequest,
    ) -> ClientResult<Option<serde_json::Value>> {
        let reply = self
            .post_responses(
                api_key,
                request,
                Some(TextFormat::JsonObject),
                self.config.json_timeout,
            )
            .await?;

        let text = extract_response_text(&reply);
        if text.is_empty() {
            debug!("Reply carried no output text");
            return Ok(None);
        }
        parse_json_object(&text).map(Some)
    }
}
