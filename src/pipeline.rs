//! Fetch → extract → validate, once per page request.
//!
//! [`Pipeline::run`] always returns a list of records. A failing stage ends
//! the run early with a single sentinel record describing the failure.

use crate::api::CompletionClient;
use crate::extractor::Extractor;
use crate::fetcher::PageSource;
use crate::models::ArticleRecord;
use crate::validator::validate;
use std::time::Instant;
use tracing::{info, instrument};

/// The extraction workflow with its two injected dependencies.
#[derive(Debug)]
pub struct Pipeline<F, C> {
    source: F,
    extractor: Extractor<C>,
}

impl<F, C> Pipeline<F, C>
where
    F: PageSource,
    C: CompletionClient,
{
    pub fn new(source: F, extractor: Extractor<C>) -> Self {
        Self { source, extractor }
    }

    /// Run every stage anew. Nothing is cached between calls.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self) -> Vec<ArticleRecord> {
        let t0 = Instant::now();

        let markup = match self.source.fetch_page().await {
            Ok(markup) => markup,
            Err(e) => return vec![ArticleRecord::from(&e)],
        };

        let raw = match self.extractor.extract(&markup).await {
            Ok(raw) => raw,
            Err(e) => return vec![ArticleRecord::from(&e)],
        };

        let articles = validate(&raw);
        info!(
            count = articles.len(),
            failed = articles.len() == 1 && articles[0].is_sentinel(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Pipeline run complete"
        );
        articles
    }
}
