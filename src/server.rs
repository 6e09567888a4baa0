//! Web interface.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /` | HTML page listing the articles |
//! | `GET /api/articles` | the same records as a JSON array |
//!
//! Both routes run the whole pipeline on every request and always answer
//! `200 OK`; failures show up as a sentinel record in the list.

use crate::api::CompletionClient;
use crate::fetcher::PageSource;
use crate::models::ArticleRecord;
use crate::outputs::html::render_page;
use crate::pipeline::Pipeline;
use crate::utils::time_of_day;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Local;
use std::sync::Arc;
use tracing::{info, instrument};

/// Build the router around a shared pipeline.
pub fn router<F, C>(pipeline: Arc<Pipeline<F, C>>) -> Router
where
    F: PageSource + 'static,
    C: CompletionClient + 'static,
{
    Router::new()
        .route("/", get(index::<F, C>))
        .route("/api/articles", get(articles::<F, C>))
        .with_state(pipeline)
}

#[instrument(level = "info", skip_all)]
async fn index<F, C>(State(pipeline): State<Arc<Pipeline<F, C>>>) -> Html<String>
where
    F: PageSource,
    C: CompletionClient,
{
    let articles = pipeline.run().await;
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    info!(count = articles.len(), "Rendering article page");
    Html(render_page(&articles, &time_of_day(), &generated_at))
}

#[instrument(level = "info", skip_all)]
async fn articles<F, C>(State(pipeline): State<Arc<Pipeline<F, C>>>) -> Json<Vec<ArticleRecord>>
where
    F: PageSource,
    C: CompletionClient,
{
    let articles = pipeline.run().await;
    info!(count = articles.len(), "Serving article JSON");
    Json(articles)
}
