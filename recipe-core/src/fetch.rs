//! Page fetching for link mode.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::FetchError;

/// Browser-like user agent; some recipe sites refuse obvious bots.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Trait for page fetchers, enabling mockability in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw body of a page as text.
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetcher backed by a shared reqwest client. No timeout beyond the
/// client defaults, redirects are followed the reqwest way.
pub struct ReqwestFetcher {
    inner: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        tracing::debug!(url, "network: fetching page");
        let response = self.inner.get(parsed).send().await?.error_for_status()?;
        let body = response.text().await?;
        tracing::debug!(url, bytes = body.len(), "network: fetched page");
        Ok(body)
    }
}

/// Mock fetcher for testing.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, Result<String, String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    /// Fail requests for `url`.
    pub fn with_error(mut self, url: &str, error: &str) -> Self {
        self.pages.insert(url.to_string(), Err(error.to_string()));
        self
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        match self.pages.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(e)) => Err(FetchError::InvalidUrl(e.clone())),
            None => Err(FetchError::InvalidUrl(format!(
                "No mock page for URL: {}",
                url
            ))),
        }
    }
}
