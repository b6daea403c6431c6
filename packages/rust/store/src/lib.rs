//! Article Store boundary.
//!
//! The store is the single writer of durable state. The pipeline talks to it
//! through the [`ArticleStore`] trait:
//! - [`HttpArticleStore`]: the REST API (`/articles`) used in production
//! - [`MemoryArticleStore`]: the same contract held in memory
//!
//! `update_article` is the only way an article becomes completed: the store
//! sets `updated_content` and forces `status = completed` in one step.

mod http;
mod memory;

use async_trait::async_trait;

use postforge_shared::{Article, ArticleId, NewArticle, Result};

pub use http::HttpArticleStore;
pub use memory::MemoryArticleStore;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Full collection, in store order. No pagination.
    async fn list_articles(&self) -> Result<Vec<Article>>;

    /// Single article, or [`postforge_shared::PostforgeError::NotFound`].
    async fn get_article(&self, id: ArticleId) -> Result<Article>;

    /// Persist rewritten content; the store marks the article completed.
    async fn update_article(&self, id: ArticleId, updated_content: &str) -> Result<Article>;

    /// Create an article (ingestion only).
    async fn create_article(&self, article: &NewArticle) -> Result<Article>;

    /// Pending articles in listing order, filtered client-side.
    async fn list_pending(&self) -> Result<Vec<Article>> {
        Ok(self
            .list_articles()
            .await?
            .into_iter()
            .filter(Article::is_pending)
            .collect())
    }

    /// Whether an article with exactly this title exists.
    async fn title_exists(&self, title: &str) -> Result<bool> {
        Ok(self.list_articles().await?.iter().any(|a| a.title == title))
    }
}
