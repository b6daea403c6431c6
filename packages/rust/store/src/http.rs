//! REST client for the Article Store API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use postforge_shared::{
    Article, ArticleId, ArticleUpdate, NewArticle, PostforgeError, Result, StoreConfig,
};

use crate::ArticleStore;

/// User-Agent string for store requests.
const USER_AGENT: &str = concat!("postforge/", env!("CARGO_PKG_VERSION"));

/// `PUT` responses come wrapped (`{message, article}`) or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UpdateResponse {
    Wrapped { article: Article },
    Bare(Article),
}

impl UpdateResponse {
    fn into_article(self) -> Article {
        match self {
            Self::Wrapped { article } | Self::Bare(article) => article,
        }
    }
}

/// Error body returned by the store for 404/422 responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpArticleStore {
    client: Client,
    base_url: String,
}

impl HttpArticleStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PostforgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    fn articles_url(&self) -> String {
        format!("{}/articles", self.base_url)
    }

    fn article_url(&self, id: ArticleId) -> String {
        format!("{}/articles/{id}", self.base_url)
    }
}

/// Map a non-2xx store response to the matching error variant.
/// 404 only means "article not found" for single-article routes.
async fn error_for(response: Response, id: Option<ArticleId>, url: &str) -> PostforgeError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.to_string());

    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => PostforgeError::NotFound(id.to_string()),
        (StatusCode::UNPROCESSABLE_ENTITY, _) => PostforgeError::validation(message),
        _ => PostforgeError::Store(format!("{url}: HTTP {status}: {message}")),
    }
}

async fn send(request: reqwest::RequestBuilder, url: &str) -> Result<Response> {
    request
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| PostforgeError::Network(format!("{url}: {e}")))
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response, url: &str) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| PostforgeError::parse(format!("{url}: invalid store response: {e}")))
}

#[async_trait]
impl ArticleStore for HttpArticleStore {
    #[instrument(skip_all)]
    async fn list_articles(&self) -> Result<Vec<Article>> {
        let url = self.articles_url();
        let response = send(self.client.get(&url), &url).await?;
        if !response.status().is_success() {
            return Err(error_for(response, None, &url).await);
        }
        let articles: Vec<Article> = decode(response, &url).await?;
        debug!(count = articles.len(), "listed articles");
        Ok(articles)
    }

    async fn get_article(&self, id: ArticleId) -> Result<Article> {
        let url = self.article_url(id);
        let response = send(self.client.get(&url), &url).await?;
        if !response.status().is_success() {
            return Err(error_for(response, Some(id), &url).await);
        }
        decode(response, &url).await
    }

    #[instrument(skip(self, updated_content), fields(len = updated_content.len()))]
    async fn update_article(&self, id: ArticleId, updated_content: &str) -> Result<Article> {
        let url = self.article_url(id);
        let body = ArticleUpdate {
            updated_content: updated_content.to_string(),
        };
        let response = send(self.client.put(&url).json(&body), &url).await?;
        if !response.status().is_success() {
            return Err(error_for(response, Some(id), &url).await);
        }
        let updated: UpdateResponse = decode(response, &url).await?;
        Ok(updated.into_article())
    }

    #[instrument(skip_all, fields(title = %article.title))]
    async fn create_article(&self, article: &NewArticle) -> Result<Article> {
        let url = self.articles_url();
        let response = send(self.client.post(&url).json(article), &url).await?;
        if !response.status().is_success() {
            return Err(error_for(response, None, &url).await);
        }
        let created: UpdateResponse = decode(response, &url).await?;
        Ok(created.into_article())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postforge_shared::ArticleStatus;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn article_json(
        id: u64,
        title: &str,
        status: &str,
        updated: Option<&str>,
    ) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": title,
            "original_content": format!("<p>{title}</p>"),
            "updated_content": updated,
            "status": status,
            "created_at": "2025-12-22T22:03:30.000000Z",
            "updated_at": "2025-12-22T22:03:30.000000Z"
        })
    }

    fn store(server: &MockServer) -> HttpArticleStore {
        HttpArticleStore::new(&format!("{}/api/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn list_pending_filters_client_side() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                article_json(1, "A", "pending", None),
                article_json(2, "B", "completed", Some("<p>new</p>")),
                article_json(3, "C", "pending", None),
            ])))
            .mount(&server)
            .await;

        let pending = store(&server).list_pending().await.unwrap();
        let ids: Vec<u64> = pending.iter().map(|a| a.id.0).collect();
        assert_eq!(ids, [1, 3]);
    }

    #[tokio::test]
    async fn title_exists_is_exact_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                article_json(1, "Chatbots 101", "pending", None)
            ])))
            .mount(&server)
            .await;

        let store = store(&server);
        assert!(store.title_exists("Chatbots 101").await.unwrap());
        assert!(!store.title_exists("chatbots 101").await.unwrap());
        assert!(!store.title_exists("Chatbots 101 ").await.unwrap());
    }

    #[tokio::test]
    async fn update_sends_content_and_reads_wrapped_article() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/articles/4"))
            .and(body_json(serde_json::json!({"updated_content": "<p>rewritten</p>"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Article updated successfully",
                "article": article_json(4, "D", "completed", Some("<p>rewritten</p>")),
            })))
            .expect(1)
            .mount(&server)
            .await;

        let article = store(&server)
            .update_article(ArticleId(4), "<p>rewritten</p>")
            .await
            .unwrap();
        assert_eq!(article.status, ArticleStatus::Completed);
        assert_eq!(article.updated_content.as_deref(), Some("<p>rewritten</p>"));
    }

    #[tokio::test]
    async fn update_missing_article_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/articles/99"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "Article not found"})),
            )
            .mount(&server)
            .await;

        let err = store(&server).update_article(ArticleId(99), "x").await.unwrap_err();
        assert!(matches!(err, PostforgeError::NotFound(ref id) if id == "99"));
    }

    #[tokio::test]
    async fn update_validation_error_carries_store_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/articles/5"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "The updated content field is required.",
                "errors": {"updated_content": ["The updated content field is required."]}
            })))
            .mount(&server)
            .await;

        let err = store(&server).update_article(ArticleId(5), "").await.unwrap_err();
        assert!(matches!(err, PostforgeError::Validation { .. }));
        assert!(err.to_string().contains("updated content field is required"));
    }

    #[tokio::test]
    async fn get_article_reads_bare_article() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles/2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(article_json(2, "B", "pending", None)),
            )
            .mount(&server)
            .await;

        let article = store(&server).get_article(ArticleId(2)).await.unwrap();
        assert_eq!(article.title, "B");
    }

    #[tokio::test]
    async fn create_posts_pending_article() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/articles"))
            .and(body_json(serde_json::json!({
                "title": "New post",
                "original_content": "<p>body</p>",
                "status": "pending"
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(article_json(10, "New post", "pending", None)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let created = store(&server)
            .create_article(&NewArticle::pending("New post", "<p>body</p>"))
            .await
            .unwrap();
        assert_eq!(created.id, ArticleId(10));
    }

    #[tokio::test]
    async fn listing_server_error_is_store_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = store(&server).list_articles().await.unwrap_err();
        assert!(matches!(err, PostforgeError::Store(_)));
    }

    #[tokio::test]
    async fn unreachable_store_is_network_error() {
        // Nothing listens on the discard port
        let store =
            HttpArticleStore::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap();
        let err = store.list_articles().await.unwrap_err();
        assert!(matches!(err, PostforgeError::Network(_)));
    }
}
