//! HTTP fetching for pages, site files and search result pages

use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::USER_AGENT;
use std::time::Duration;
use tracing::debug;

/// User-Agent sent to search engines, which reject obvious bots
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin wrapper around a pooled [`reqwest::Client`].
///
/// Cloning is cheap; all clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!(
                "Mozilla/5.0 (compatible; amplifyx/{})",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch a URL and return the body as text.
    ///
    /// Non-success status codes are reported as errors.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "fetching");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;

        response
            .error_for_status()
            .with_context(|| format!("non-success status from {}", url))?
            .text()
            .await
            .with_context(|| format!("failed to read response body from {}", url))
    }

    /// Same as [`get_text`](Self::get_text) but presents a browser User-Agent
    pub async fn get_text_as_browser(&self, url: &str) -> Result<String> {
        debug!(url, "fetching as browser");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;

        response
            .error_for_status()
            .with_context(|| format!("non-success status from {}", url))?
            .text()
            .await
            .with_context(|| format!("failed to read response body from {}", url))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_text_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello</p>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let body = fetcher
            .get_text(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<p>hello</p>");
    }

    #[tokio::test]
    async fn test_get_text_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let result = fetcher.get_text(&format!("{}/missing", server.uri())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_browser_user_agent_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(header("user-agent", BROWSER_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let body = fetcher
            .get_text_as_browser(&format!("{}/search", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }
}
