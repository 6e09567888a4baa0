//! Hacker News homepage fetcher.
//!
//! Issues a single GET with browser-like headers, accepts only `200 OK`,
//! normalizes the markup by parsing and re-serializing it, and leaves a copy
//! of the result on disk for inspection.

use crate::error::FetchError;
use once_cell::sync::Lazy;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use scraper::Html;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};
use url::Url;

pub const DEFAULT_TARGET_URL: &str = "https://news.ycombinator.com/";
pub const DEFAULT_DEBUG_DUMP: &str = "hn_content.html";

static BROWSER_HEADERS: Lazy<HeaderMap> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
});

/// Something that can produce the page markup to extract articles from.
pub trait PageSource: Send + Sync {
    fn fetch_page(&self) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches one fixed URL over HTTP.
#[derive(Debug, Clone)]
pub struct HomepageFetcher {
    client: Client,
    url: Url,
    dump_path: PathBuf,
}

impl HomepageFetcher {
    /// Build a fetcher whose client always sends the browser header set.
    pub fn new(url: Url, dump_path: PathBuf, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .default_headers(BROWSER_HEADERS.clone())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url,
            dump_path,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn dump_path(&self) -> &Path {
        &self.dump_path
    }

    /// Overwrite the debug dump. A failed write is only logged.
    async fn write_dump(&self, markup: &str) {
        match tokio::fs::write(&self.dump_path, markup).await {
            Ok(()) => info!(path = %self.dump_path.display(), "Saved HTML content for inspection"),
            Err(e) => warn!(path = %self.dump_path.display(), error = %e, "Could not write debug dump"),
        }
    }
}

impl PageSource for HomepageFetcher {
    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    async fn fetch_page(&self) -> Result<String, FetchError> {
        let t0 = Instant::now();
        info!("Attempting to fetch homepage");

        let response = self.client.get(self.url.clone()).send().await.map_err(|e| {
            error!(error = %e, "Error fetching URL");
            FetchError::Request(e)
        })?;

        let status = response.status();
        info!(status = status.as_u16(), "Response status code");
        if status != StatusCode::OK {
            error!(status = status.as_u16(), "Unexpected status code");
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let markup = normalize_markup(&body);
        info!(
            chars = markup.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched HTML content"
        );

        self.write_dump(&markup).await;
        Ok(markup)
    }
}

/// Parse `body` as an HTML document and serialize it back.
///
/// Repairs unbalanced markup and yields a full `<html>` document.
pub fn normalize_markup(body: &str) -> String {
    Html::parse_document(body).html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::HeaderMap as AxumHeaders;
    use axum::response::Html as AxumHtml;
    use axum::routing::get;
    use std::net::SocketAddr;

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn temp_dump(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("awful_hn_{}_{}.html", name, std::process::id()))
    }

    fn fetcher_for(addr: SocketAddr, dump: PathBuf) -> HomepageFetcher {
        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        HomepageFetcher::new(url, dump, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_normalize_markup_wraps_fragment() {
        let out = normalize_markup("<p>Hello<b>world");
        assert!(out.starts_with("<html>"));
        assert!(out.contains("<p>Hello<b>world</b></p>"));
        assert!(out.ends_with("</html>"));
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers_and_dumps() {
        let router = Router::new().route(
            "/",
            get(|headers: AxumHeaders| async move {
                let ua = headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let lang = headers
                    .get("accept-language")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                AxumHtml(format!("<p id=\"ua\">{ua}</p><p id=\"lang\">{lang}</p>"))
            }),
        );
        let addr = serve(router).await;
        let dump = temp_dump("ok");
        let fetcher = fetcher_for(addr, dump.clone());

        let markup = fetcher.fetch_page().await.unwrap();
        assert!(markup.contains("Chrome/123.0.0.0 Safari/537.36"));
        assert!(markup.contains("en-US,en;q=0.9"));

        let on_disk = std::fs::read_to_string(&dump).unwrap();
        assert_eq!(on_disk, markup);
        let _ = std::fs::remove_file(&dump);
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_status_error() {
        let router = Router::new().route("/", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let addr = serve(router).await;
        let dump = temp_dump("503");
        let fetcher = fetcher_for(addr, dump.clone());

        match fetcher.fetch_page().await {
            Err(FetchError::Status(s)) => assert_eq!(s, StatusCode::SERVICE_UNAVAILABLE),
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(!dump.exists());
    }

    #[tokio::test]
    async fn test_fetch_other_2xx_is_still_failure() {
        let router = Router::new().route("/", get(|| async { StatusCode::NO_CONTENT }));
        let addr = serve(router).await;
        let fetcher = fetcher_for(addr, temp_dump("204"));

        assert!(matches!(
            fetcher.fetch_page().await,
            Err(FetchError::Status(StatusCode::NO_CONTENT))
        ));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_request_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let fetcher = fetcher_for(addr, temp_dump("refused"));

        assert!(matches!(
            fetcher.fetch_page().await,
            Err(FetchError::Request(_))
        ));
    }
}
