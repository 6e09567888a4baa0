//! # Awful HN Extract
//!
//! Serves the Hacker News front page as a list of structured articles. The
//! page markup is not scraped with selectors; it is handed to an
//! OpenAI-compatible LLM which is asked to return the articles as JSON.
//!
//! ## Usage
//!
//! ```sh
//! OPENAI_API_KEY=sk-... awful_hn_extract --bind 127.0.0.1:5000
//! curl http://127.0.0.1:5000/api/articles
//! ```
//!
//! ## Architecture
//!
//! Every page request runs the same linear pipeline:
//! 1. **Fetching**: GET the homepage with browser headers, dump it to disk
//! 2. **Extraction**: send the markup to the completion service
//! 3. **Validation**: parse the answer into article records
//! 4. **Presentation**: render HTML or JSON
//!
//! Any failure becomes a single error record, so both routes always render.

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod extractor;
mod fetcher;
mod models;
mod outputs;
mod pipeline;
mod server;
mod utils;
mod validator;

use api::OpenAiClient;
use cli::Cli;
use config::Settings;
use extractor::Extractor;
use fetcher::HomepageFetcher;
use pipeline::Pipeline;
use utils::ensure_writable_parent;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "awful_hn_extract starting up");

    let args = Cli::parse();
    let settings = Settings::load(&args)?;
    info!(
        bind = %settings.bind,
        target_url = %settings.target_url,
        model = %settings.model,
        api_base = %settings.api_base,
        debug_dump = %settings.debug_dump.display(),
        "Resolved settings"
    );

    if settings.api_key.is_none() {
        error!("OPENAI_API_KEY not found in environment variables");
    }
    settings.check_api_key()?;
    if settings.api_key.is_none() {
        warn!("Starting without an API key; every request will render an error record");
    }

    // Diagnostic only, not fatal.
    if let Err(e) = ensure_writable_parent(&settings.debug_dump).await {
        warn!(
            path = %settings.debug_dump.display(),
            error = %e,
            "Debug dump location is not writable; fetched pages will not be saved"
        );
    }

    let fetcher = HomepageFetcher::new(
        settings.target_url.clone(),
        settings.debug_dump.clone(),
        settings.fetch_timeout,
    )?;
    let client = OpenAiClient::new(
        settings.api_base.clone(),
        settings.api_key.clone(),
        settings.completion_timeout,
    )?;
    let extractor = Extractor::new(client, settings.model.clone());
    info!(
        url = %fetcher.url(),
        dump = %fetcher.dump_path().display(),
        model = %extractor.model(),
        "Pipeline ready"
    );
    let pipeline = Arc::new(Pipeline::new(fetcher, extractor));

    let listener = TcpListener::bind(settings.bind).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, server::router(pipeline)).await?;

    Ok(())
}
