//! In-memory article store with the same contract as the REST API.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use postforge_shared::{Article, ArticleId, ArticleStatus, NewArticle, PostforgeError, Result};

use crate::ArticleStore;

#[derive(Debug, Default)]
struct Inner {
    articles: Vec<Article>,
    next_id: u64,
}

/// Articles kept in a `Vec` in ascending id order.
#[derive(Debug, Default)]
pub struct MemoryArticleStore {
    inner: Mutex<Inner>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with pending articles `(title, original_content)`, ids starting at 1.
    /// Fails on the first item the store would reject.
    pub async fn with_pending(items: &[(&str, &str)]) -> Result<Self> {
        let store = Self::new();
        for (title, content) in items {
            store
                .create_article(&NewArticle::pending(*title, *content))
                .await?;
        }
        Ok(store)
    }

    /// Snapshot of every stored article.
    pub async fn snapshot(&self) -> Vec<Article> {
        self.inner.lock().await.articles.clone()
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn list_articles(&self) -> Result<Vec<Article>> {
        Ok(self.snapshot().await)
    }

    async fn get_article(&self, id: ArticleId) -> Result<Article> {
        let inner = self.inner.lock().await;
        inner
            .articles
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| PostforgeError::NotFound(id.to_string()))
    }

    async fn update_article(&self, id: ArticleId, updated_content: &str) -> Result<Article> {
        if updated_content.is_empty() {
            return Err(PostforgeError::validation(
                "The updated content field is required.",
            ));
        }

        let mut inner = self.inner.lock().await;
        let article = inner
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| PostforgeError::NotFound(id.to_string()))?;

        article.updated_content = Some(updated_content.to_string());
        article.status = ArticleStatus::Completed;
        article.updated_at = Some(Utc::now());
        Ok(article.clone())
    }

    async fn create_article(&self, new: &NewArticle) -> Result<Article> {
        if new.title.trim().is_empty() {
            return Err(PostforgeError::validation("The title field is required."));
        }

        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let now = Utc::now();
        let article = Article {
            id: ArticleId(inner.next_id),
            title: new.title.clone(),
            original_content: new.original_content.clone(),
            updated_content: None,
            status: new.status,
            created_at: Some(now),
            updated_at: Some(now),
        };
        inner.articles.push(article.clone());
        Ok(article)
    }
}
