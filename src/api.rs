//! Completion service client.
//!
//! - [`CompletionClient`]: the seam the extractor talks through
//! - [`OpenAiClient`]: an OpenAI-compatible `/chat/completions` implementation
//!
//! No retry layer: each page request makes exactly one completion call.

use crate::error::ExtractionError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Output format directive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object",
        }
    }
}

/// Body of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Trait for sending one completion request and getting the model's text back.
///
/// Implementors must not panic on service failures; every problem is an
/// [`ExtractionError`].
pub trait CompletionClient: Send + Sync {
    /// Send `request` and return the first choice's message content.
    ///
    /// # Errors
    ///
    /// Any [`ExtractionError`]: no credential, a transport failure, an error
    /// status from the service, an undecodable envelope, or an answer with no
    /// content.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, ExtractionError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_base: Url,
    api_key: Option<String>,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_base", &self.api_base.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl OpenAiClient {
    /// Build a client for the service rooted at `api_base`.
    ///
    /// # Arguments
    ///
    /// * `api_base` - Base URL, e.g. `https://api.openai.com/v1`; requests go to
    ///   `{api_base}/chat/completions`
    /// * `api_key` - Bearer credential. `None` is accepted here and every call
    ///   then fails with [`ExtractionError::MissingApiKey`]
    /// * `timeout` - Total time allowed for one call
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client cannot be built (for
    /// example when the TLS backend fails to initialize).
    pub fn new(api_base: Url, api_key: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.as_str().trim_end_matches('/'))
    }
}

impl CompletionClient for OpenAiClient {
    #[instrument(level = "info", skip_all, fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ExtractionError> {
        let api_key = self.api_key.as_deref().ok_or(ExtractionError::MissingApiKey)?;
        let t0 = Instant::now();
        info!(endpoint = %self.endpoint(), "Sending request to completion service");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| truncate_for_log(&body, 300));
            warn!(
                status = status.as_u16(),
                elapsed_ms = dt.as_millis() as u64,
                error = %message,
                "API call failed"
            );
            return Err(ExtractionError::Api { status, message });
        }

        let completion: ChatCompletion = serde_json::from_str(&body)?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ExtractionError::EmptyResponse)?;

        info!(
            elapsed_ms = dt.as_millis() as u64,
            response_chars = text.len(),
            "Received response from completion service"
        );
        Ok(text)
    }
}
