//! Web search provider seam and the Serper client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use postforge_shared::{PostforgeError, Result, SearchConfig, validate_api_key};

/// A web search backend returning result links in rank order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Organic result links for `query`, at most `result_count` of them.
    async fn search(&self, query: &str, result_count: u32) -> Result<Vec<String>>;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    link: Option<String>,
}

/// Google results through the Serper API.
pub struct SerperClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl SerperClient {
    pub fn new(endpoint: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PostforgeError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build from config, reading the key from the configured env var.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let key = validate_api_key(&config.api_key_env, "Serper")?;
        Self::new(&config.endpoint, key, Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, result_count: u32) -> Result<Vec<String>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&SearchRequest {
                q: query,
                num: result_count,
            })
            .send()
            .await
            .map_err(|e| PostforgeError::Search(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PostforgeError::Search(format!(
                "{}: HTTP {status}",
                self.endpoint
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| PostforgeError::Search(format!("invalid search response: {e}")))?;

        let links: Vec<String> = body.organic.into_iter().filter_map(|r| r.link).collect();
        debug!(count = links.len(), "search returned links");
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_posts_query_and_reads_organic_links() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("X-API-KEY", "test-key"))
            .and(body_json(serde_json::json!({"q": "AI chatbots", "num": 5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "searchParameters": {"q": "AI chatbots"},
                "organic": [
                    {"title": "One", "link": "https://one.example/a", "position": 1},
                    {"title": "No link", "position": 2},
                    {"title": "Two", "link": "https://two.example/b", "position": 3}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SerperClient::new(
            &format!("{}/search", server.uri()),
            "test-key",
            Duration::from_secs(5),
        )
        .unwrap();
        let links = client.search("AI chatbots", 5).await.unwrap();
        assert_eq!(links, ["https://one.example/a", "https://two.example/b"]);
    }

    #[tokio::test]
    async fn missing_organic_field_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = SerperClient::new(&server.uri(), "k", Duration::from_secs(5)).unwrap();
        assert!(client.search("q", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn quota_error_is_search_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = SerperClient::new(&server.uri(), "k", Duration::from_secs(5)).unwrap();
        let err = client.search("q", 5).await.unwrap_err();
        assert!(matches!(err, PostforgeError::Search(_)));
    }
}
