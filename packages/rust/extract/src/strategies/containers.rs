//! Primary listing strategy: one candidate per post container.

use postforge_shared::{Candidate, Result};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{CandidateStrategy, element_text, parse_selector, resolve_href, same_site};

const CONTAINER_SELECTOR: &str = "article, .post, .blog-post, .card";
const HEADING_SELECTOR: &str = "h2, h3, h5, .entry-title";
const ANCHOR_SELECTOR: &str = "a";

/// Looks for generic post/card containers and takes the first heading and
/// the first anchor inside each one. Only same-site links are kept.
pub struct ContainerStrategy {
    container: Selector,
    heading: Selector,
    anchor: Selector,
}

impl ContainerStrategy {
    pub fn new() -> Result<Self> {
        Ok(Self {
            container: parse_selector(CONTAINER_SELECTOR)?,
            heading: parse_selector(HEADING_SELECTOR)?,
            anchor: parse_selector(ANCHOR_SELECTOR)?,
        })
    }
}

impl CandidateStrategy for ContainerStrategy {
    fn extract(&self, doc: &Html, base: &Url) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for container in doc.select(&self.container) {
            let (Some(heading), Some(anchor)) = (
                container.select(&self.heading).next(),
                container.select(&self.anchor).next(),
            ) else {
                continue;
            };

            let title = element_text(&heading);
            if title.is_empty() {
                continue;
            }

            let Some(link) = resolve_href(&anchor, base) else {
                continue;
            };

            if !same_site(&link, base) {
                debug!(%link, "off-site link in post container, skipping");
                continue;
            }

            candidates.push(Candidate::new(title, link.to_string()));
        }

        candidates
    }

    fn name(&self) -> &str {
        "containers"
    }
}
