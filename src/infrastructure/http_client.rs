//! HTTP page fetching for registry pages
//!
//! `PageFetcher` is the seam between the extraction pipeline and the network.
//! The reqwest-backed `HttpClient` sends a fixed browser-like header set and
//! fails fast: no retries and no rate limiting.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::infrastructure::config::HttpConfig;

/// Fixed request headers sent with every page fetch
pub mod browser_headers {
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
    pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
    pub const ACCEPT_LANGUAGE: &str = "sv-SE,sv;q=0.9,en-US;q=0.8,en;q=0.7";
    pub const CONNECTION: &str = "keep-alive";
}

/// Retrieves the raw HTML of a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// reqwest-backed page fetcher
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(Self::default_headers())
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// The browser-like header set
    pub fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(browser_headers::USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(browser_headers::ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(browser_headers::ACCEPT_LANGUAGE),
        );
        headers.insert(CONNECTION, HeaderValue::from_static(browser_headers::CONNECTION));
        headers
    }

    /// Get the configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        tracing::info!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch URL: {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP request failed with status {}: {}", response.status(), url);
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from: {url}"))?;

        tracing::debug!("Successfully fetched: {} ({} chars)", url, text.len());
        Ok(text)
    }
}
