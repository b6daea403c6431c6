//! HTML page fetching for listing, detail, and research pages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use postforge_shared::{PostforgeError, Result};

/// Maximum number of redirects followed per page.
const MAX_REDIRECTS: usize = 5;

/// Source of raw HTML documents.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the response body. Non-2xx is an error.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP GET with a browser-like User-Agent.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| PostforgeError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PostforgeError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PostforgeError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| PostforgeError::Network(format!("{url}: body read failed: {e}")))
    }
}
