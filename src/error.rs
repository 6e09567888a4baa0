//! Error types for startup and for each stage of the extraction pipeline.
//!
//! Only [`ConfigError`] can stop the process. The stage errors never reach the
//! web surface: the pipeline turns every one of them into a sentinel
//! [`ArticleRecord`](crate::models::ArticleRecord) so the presenter always has
//! a list to render.

use reqwest::StatusCode;
use std::path::PathBuf;

/// Invalid startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{field} is not a valid URL ({value}): {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("OPENAI_API_KEY not found in environment (pass --allow-missing-api-key to start anyway)")]
    MissingApiKey,
}

/// Failure while fetching the homepage.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The site answered, but not with `200 OK`.
    #[error("received status code {0}")]
    Status(StatusCode),

    /// DNS, connect, timeout, reset or body read failure.
    #[error("{0}")]
    Request(#[from] reqwest::Error),
}

/// Failure while calling the completion service.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// No API key was configured; the call is refused before going out.
    #[error("no API key configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    /// Network-level failure talking to the service.
    #[error("request to completion service failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service rejected the request (auth, quota, oversized prompt...).
    #[error("completion service returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    /// The response body was not the expected chat-completion envelope.
    #[error("could not decode completion response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The envelope decoded but carried no message content.
    #[error("completion response contained no message content")]
    EmptyResponse,
}

/// The model's text could not be turned into a list of records.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Could not parse AI response")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Unexpected response format")]
    UnexpectedFormat,

    #[error("Parsed JSON is not a list.")]
    NotAList,
}
