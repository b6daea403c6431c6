//! Main-content extraction from article and research pages.
//!
//! A [`ContentExtractor`] holds an ordered selector list (most specific
//! wrapper first, whole body last). The first selector matching at least one
//! element decides the output; later selectors are never consulted.

use scraper::{Html, Selector};
use tracing::debug;

use postforge_shared::Result;

use crate::strategies::parse_selector;

/// Marker stored in place of content when no selector matched.
pub const CONTENT_NOT_FOUND: &str = "Content not found";

/// Selector order for blog detail pages captured at ingestion.
pub const INGESTION_SELECTORS: &[&str] = &[
    ".entry-content",
    ".post-content",
    ".blog-content",
    "article",
    "main",
    "body",
];

/// Selector order for arbitrary research sources.
pub const RESEARCH_SELECTORS: &[&str] = &["article", "main", "body"];

/// How matched content is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    /// Inner HTML of the first matched element.
    Html,
    /// Visible text of every element matched by the winning selector.
    Text,
}

/// Outcome of content extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Found {
        /// The selector that matched.
        selector: String,
        content: String,
    },
    NotFound,
}

impl Extracted {
    /// Content, or the [`CONTENT_NOT_FOUND`] sentinel.
    pub fn into_content(self) -> String {
        match self {
            Self::Found { content, .. } => content,
            Self::NotFound => CONTENT_NOT_FOUND.to_string(),
        }
    }

    /// Content, or an empty string. For consumers that treat "not found" as no data.
    pub fn into_content_or_empty(self) -> String {
        match self {
            Self::Found { content, .. } => content,
            Self::NotFound => String::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

struct SelectorTier {
    source: String,
    selector: Selector,
}

/// Ordered content-container cascade.
pub struct ContentExtractor {
    tiers: Vec<SelectorTier>,
    format: ContentFormat,
}

impl ContentExtractor {
    /// Build from an ordered selector list. Fails on an invalid selector.
    pub fn new(selectors: &[&str], format: ContentFormat) -> Result<Self> {
        let tiers = selectors
            .iter()
            .map(|s| -> Result<SelectorTier> {
                Ok(SelectorTier {
                    source: (*s).to_string(),
                    selector: parse_selector(s)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { tiers, format })
    }

    /// Extractor for blog detail pages (HTML output).
    pub fn ingestion() -> Result<Self> {
        Self::new(INGESTION_SELECTORS, ContentFormat::Html)
    }

    /// Extractor for research sources (text output).
    pub fn research() -> Result<Self> {
        Self::new(RESEARCH_SELECTORS, ContentFormat::Text)
    }

    pub fn extract(&self, html: &str) -> Extracted {
        let doc = Html::parse_document(html);
        self.extract_document(&doc)
    }

    pub fn extract_document(&self, doc: &Html) -> Extracted {
        for tier in &self.tiers {
            let mut matches = doc.select(&tier.selector).peekable();
            if matches.peek().is_none() {
                continue;
            }

            let content = match self.format {
                ContentFormat::Html => matches.next().map(|el| el.inner_html()).unwrap_or_default(),
                ContentFormat::Text => matches
                    .map(|el| el.text().collect::<String>())
                    .collect::<Vec<_>>()
                    .join(" "),
            };

            debug!(selector = %tier.source, len = content.len(), "content container matched");
            return Extracted::Found {
                selector: tier.source.clone(),
                content,
            };
        }

        Extracted::NotFound
    }
}
