//! Candidate listing strategies for blog index pages.
//!
//! Listing markup is unknown ahead of time, so extraction is a cascade:
//! strategies are tried in priority order and the first one that yields
//! at least one candidate wins. A later strategy only runs when every
//! earlier one came back completely empty.

mod containers;
mod heading_links;

use std::collections::HashSet;

use postforge_shared::{Candidate, PostforgeError, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

pub use containers::ContainerStrategy;
pub use heading_links::HeadingLinkStrategy;

use crate::text::collapse_whitespace;

/// Number of candidates kept by [`select_oldest`] when no limit is configured.
pub const DEFAULT_SELECTION_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One tier of the candidate cascade. Must be pure: same document, same output.
pub trait CandidateStrategy: Send + Sync {
    /// Extract candidates in discovery order. An empty result hands over
    /// to the next strategy.
    fn extract(&self, doc: &Html, base: &Url) -> Vec<Candidate>;

    /// Human-readable strategy name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Candidates found on a listing page and the strategy that found them.
#[derive(Debug, Clone, Default)]
pub struct CandidateListing {
    pub candidates: Vec<Candidate>,
    /// `None` when every strategy came back empty.
    pub strategy: Option<String>,
}

/// Holds candidate strategies in priority order.
pub struct CandidateExtractor {
    strategies: Vec<Box<dyn CandidateStrategy>>,
}

impl CandidateExtractor {
    /// Built-in cascade: post containers first, heading links as fallback.
    pub fn new() -> Result<Self> {
        Ok(Self::with_strategies(vec![
            Box::new(ContainerStrategy::new()?),
            Box::new(HeadingLinkStrategy::new()?),
        ]))
    }

    pub fn with_strategies(strategies: Vec<Box<dyn CandidateStrategy>>) -> Self {
        Self { strategies }
    }

    /// Parse `html` and run the cascade against it.
    pub fn extract(&self, html: &str, base: &Url) -> CandidateListing {
        let doc = Html::parse_document(html);
        self.extract_document(&doc, base)
    }

    pub fn extract_document(&self, doc: &Html, base: &Url) -> CandidateListing {
        for strategy in &self.strategies {
            let candidates = strategy.extract(doc, base);
            if candidates.is_empty() {
                info!(strategy = strategy.name(), "strategy found no candidates, falling back");
                continue;
            }
            debug!(strategy = strategy.name(), count = candidates.len(), "candidates extracted");
            return CandidateListing {
                candidates,
                strategy: Some(strategy.name().to_string()),
            };
        }
        CandidateListing::default()
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Approximate the oldest posts on a single listing page.
///
/// Listings are assumed newest-first, so this dedups by exact link (first
/// occurrence wins), reverses discovery order and keeps `limit` entries.
/// It does not paginate to the real end of the archive.
pub fn select_oldest(candidates: Vec<Candidate>, limit: usize) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.link.clone()))
        .collect();
    unique.reverse();
    unique.truncate(limit);
    unique
}

// ---------------------------------------------------------------------------
// Helpers shared by strategies
// ---------------------------------------------------------------------------

pub(crate) fn parse_selector(source: &str) -> Result<Selector> {
    Selector::parse(source)
        .map_err(|e| PostforgeError::parse(format!("invalid selector '{source}': {e}")))
}

/// Normalized visible text of an element.
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// Resolve an anchor's `href` against the listing URL.
/// Returns `None` for fragments, script/mail links, and unparseable hrefs.
pub(crate) fn resolve_href(anchor: &ElementRef<'_>, base: &Url) -> Option<Url> {
    let href = anchor.value().attr("href")?.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
    {
        return None;
    }
    match base.join(href) {
        Ok(mut url) => {
            url.set_fragment(None);
            Some(url)
        }
        Err(e) => {
            debug!(href, error = %e, "skipping unresolvable link");
            None
        }
    }
}

/// Whether `link` lives on the same site as `base` (subdomains included).
pub(crate) fn same_site(link: &Url, base: &Url) -> bool {
    let (Some(link_host), Some(base_host)) = (link.host_str(), base.host_str()) else {
        return false;
    };
    let link_host = link_host.trim_start_matches("www.");
    let base_host = base_host.trim_start_matches("www.");
    link_host == base_host
        || link_host.ends_with(&format!(".{base_host}"))
        || base_host.ends_with(&format!(".{link_host}"))
}
