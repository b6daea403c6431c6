//! Core domain types for the enrichment pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ArticleId
// ---------------------------------------------------------------------------

/// Store-assigned article identifier. Opaque to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub u64);

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArticleId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// ---------------------------------------------------------------------------
// ArticleStatus
// ---------------------------------------------------------------------------

/// Enrichment lifecycle of an article. `Pending -> Completed` is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Pending,
    Completed,
    /// Any status value this build does not know about. Never processed.
    #[serde(other)]
    Unknown,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArticleStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown status '{other}': expected pending or completed")),
        }
    }
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// An article as held by the store. The pipeline only keeps transient copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    /// Headline; doubles as the dedup key during ingestion.
    pub title: String,
    /// HTML captured at ingestion time. Never rewritten.
    pub original_content: String,
    /// Rewritten HTML, present once synthesis has been persisted.
    #[serde(default)]
    pub updated_content: Option<String>,
    pub status: ArticleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn is_pending(&self) -> bool {
        self.status == ArticleStatus::Pending
    }
}

/// Creation payload used by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub original_content: String,
    pub status: ArticleStatus,
}

impl NewArticle {
    /// A freshly ingested article awaiting enrichment.
    pub fn pending(title: impl Into<String>, original_content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            original_content: original_content.into(),
            status: ArticleStatus::Pending,
        }
    }
}

/// Update payload; the store flips `status` to completed as a side effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleUpdate {
    pub updated_content: String,
}

// ---------------------------------------------------------------------------
// Candidate / ResearchSnippet
// ---------------------------------------------------------------------------

/// A (title, link) pair found on a listing page, before dedup and selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    /// Absolute URL of the post.
    pub link: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Condensed plain text from one research source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchSnippet {
    pub source_url: String,
    pub text: String,
}

impl ResearchSnippet {
    /// Render as a prompt block: `Source: <url>\n<text>\n`.
    pub fn to_block(&self) -> String {
        format!("Source: {}\n{}\n", self.source_url, self.text)
    }
}
