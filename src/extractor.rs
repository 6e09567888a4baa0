//! Prompt construction and the extraction call.
//!
//! The whole homepage markup is embedded in the user message as-is. Nothing
//! is chunked or truncated; if the service rejects an oversized prompt that
//! comes back as an [`ExtractionError`].

use crate::api::{ChatMessage, CompletionClient, CompletionRequest, ResponseFormat};
use crate::error::ExtractionError;
use std::time::Instant;
use tracing::{error, info, instrument};

pub const DEFAULT_MODEL: &str = "gpt-4o";

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts structured data from HTML content.
Extract information in JSON format exactly as specified, with no additional text or explanation.";

/// User message with the markup appended after the field specification.
pub fn user_prompt(markup: &str) -> String {
    format!(
        "Extract article information from the Hacker News homepage HTML below.
For each article, provide the following information in a JSON array:
1. title: The title of the article
2. author: The username of who posted it (if available, otherwise 'Unknown')
3. link: The URL to the article (make sure it's a complete URL)

Return ONLY a valid JSON array of objects with these fields, nothing else.

HTML Content:
{markup}"
    )
}

/// Turns page markup into the model's raw text answer.
#[derive(Debug)]
pub struct Extractor<C> {
    client: C,
    model: String,
}

impl<C: CompletionClient> Extractor<C> {
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    /// The request sent for `markup`: both instructions, temperature 0 and
    /// JSON-object output.
    pub fn build_request(&self, markup: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(user_prompt(markup)),
            ],
            temperature: 0.0,
            response_format: Some(ResponseFormat::json_object()),
        }
    }

    #[instrument(level = "info", skip_all, fields(model = %self.model, markup_chars = markup.len()))]
    pub async fn extract(&self, markup: &str) -> Result<String, ExtractionError> {
        let t0 = Instant::now();
        let request = self.build_request(markup);
        let res = self.client.complete(&request).await;
        let dt = t0.elapsed();

        match &res {
            Ok(text) => info!(
                elapsed_ms = dt.as_millis() as u64,
                response_chars = text.len(),
                "Extraction call succeeded"
            ),
            Err(e) => error!(elapsed_ms = dt.as_millis() as u64, error = %e, "Error calling completion API"),
        }
        res
    }
}
