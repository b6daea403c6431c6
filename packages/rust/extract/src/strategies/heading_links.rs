//! Fallback listing strategy: any link nested in a heading.

use postforge_shared::{Candidate, Result};
use scraper::{Html, Selector};
use url::Url;

use super::{CandidateStrategy, element_text, parse_selector, resolve_href};

const HEADING_LINK_SELECTOR: &str = "h2 a, h3 a";

/// Treats every anchor inside an `h2`/`h3` as a post link.
/// Looser than [`super::ContainerStrategy`]: no same-site filter.
pub struct HeadingLinkStrategy {
    links: Selector,
}

impl HeadingLinkStrategy {
    pub fn new() -> Result<Self> {
        Ok(Self {
            links: parse_selector(HEADING_LINK_SELECTOR)?,
        })
    }
}

impl CandidateStrategy for HeadingLinkStrategy {
    fn extract(&self, doc: &Html, base: &Url) -> Vec<Candidate> {
        doc.select(&self.links)
            .filter_map(|anchor| {
                let title = element_text(&anchor);
                if title.is_empty() {
                    return None;
                }
                let link = resolve_href(&anchor, base)?;
                Some(Candidate::new(title, link.to_string()))
            })
            .collect()
    }

    fn name(&self) -> &str {
        "heading-links"
    }
}
