//! Research augmentation for article rewrites.
//!
//! Given an article title, [`ResearchAugmenter`] asks a [`SearchProvider`]
//! for a handful of links, keeps the first few, fetches each page and reduces
//! it to a bounded plain-text excerpt. Failures never propagate: the caller
//! always gets a [`ResearchOutcome`] and can continue with zero research.

pub mod search;

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use postforge_extract::{ContentExtractor, PageFetcher, collapse_whitespace, truncate_chars};
use postforge_shared::{
    MAX_EXCERPT_CHARS_CAP, MAX_SOURCES_CAP, ResearchConfig, ResearchSnippet, Result, SearchConfig,
};

pub use search::{SearchProvider, SerperClient};

/// Result of one research pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResearchOutcome {
    /// At least one source produced text; concatenated `Source:` blocks.
    Found(String),
    /// Search succeeded but no source yielded text.
    Empty,
    /// The search call itself failed.
    Failed(String),
}

impl ResearchOutcome {
    /// Research string to embed in the rewrite prompt. Empty unless `Found`.
    pub fn as_prompt_text(&self) -> &str {
        match self {
            Self::Found(text) => text,
            Self::Empty | Self::Failed(_) => "",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

pub struct ResearchAugmenter {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: ContentExtractor,
    result_count: u32,
    max_sources: usize,
    max_excerpt_chars: usize,
}

impl ResearchAugmenter {
    pub fn new(search: Arc<dyn SearchProvider>, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Self::with_config(
            search,
            fetcher,
            &SearchConfig::default(),
            &ResearchConfig::default(),
        )
    }

    /// Limits above [`MAX_SOURCES_CAP`] and [`MAX_EXCERPT_CHARS_CAP`] are clamped.
    pub fn with_config(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        search_config: &SearchConfig,
        research_config: &ResearchConfig,
    ) -> Result<Self> {
        Ok(Self {
            search,
            fetcher,
            extractor: ContentExtractor::research()?,
            result_count: search_config.result_count,
            max_sources: search_config.max_sources.min(MAX_SOURCES_CAP),
            max_excerpt_chars: research_config.max_excerpt_chars.min(MAX_EXCERPT_CHARS_CAP),
        })
    }

    /// Search for `title` and condense up to `max_sources` results.
    ///
    /// Sources are fetched one at a time, in search rank order.
    #[instrument(skip_all, fields(title = %title))]
    pub async fn research(&self, title: &str) -> ResearchOutcome {
        let links = match self.search.search(title, self.result_count).await {
            Ok(links) => links,
            Err(e) => {
                warn!(error = %e, "search failed, continuing without research");
                return ResearchOutcome::Failed(e.to_string());
            }
        };

        let mut snippets = Vec::new();
        for link in links.into_iter().take(self.max_sources) {
            if let Some(snippet) = self.excerpt(&link).await {
                snippets.push(snippet);
            }
        }

        if snippets.is_empty() {
            debug!("no source produced text");
            return ResearchOutcome::Empty;
        }

        info!(sources = snippets.len(), "research gathered");
        ResearchOutcome::Found(snippets.iter().map(ResearchSnippet::to_block).collect())
    }

    /// Fetch one source and reduce it to bounded plain text.
    async fn excerpt(&self, url: &str) -> Option<ResearchSnippet> {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url, error = %e, "failed to fetch research source");
                return None;
            }
        };

        let text = collapse_whitespace(&self.extractor.extract(&html).into_content_or_empty());
        if text.is_empty() {
            debug!(url, "research source had no readable content");
            return None;
        }

        Some(ResearchSnippet {
            source_url: url.to_string(),
            text: truncate_chars(&text, self.max_excerpt_chars),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use postforge_extract::HttpFetcher;
    use postforge_shared::PostforgeError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedSearch(Vec<String>);

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, _query: &str, _count: u32) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, _query: &str, _count: u32) -> Result<Vec<String>> {
            Err(PostforgeError::Search("HTTP 429 Too Many Requests".into()))
        }
    }

    /// Records every URL it is asked for and never succeeds.
    #[derive(Default)]
    struct RecordingFetcher {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageFetcher for RecordingFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.urls.lock().unwrap().push(url.to_string());
            Err(PostforgeError::Network(format!("{url}: refused")))
        }
    }

    fn http_fetcher() -> Arc<dyn PageFetcher> {
        Arc::new(HttpFetcher::new("test-agent", Duration::from_secs(5)).unwrap())
    }

    async fn mount_page(server: &MockServer, route: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(html),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn found_concatenates_source_blocks_in_rank_order() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/one",
            "<html><body><nav>menu</nav><article>\n  First   source\ttext </article></body></html>",
        )
        .await;
        mount_page(
            &server,
            "/two",
            "<html><body><main><p>Second</p>\n<p>source</p></main></body></html>",
        )
        .await;

        let one = format!("{}/one", server.uri());
        let two = format!("{}/two", server.uri());
        let search = Arc::new(FixedSearch(vec![one.clone(), two.clone()]));
        let augmenter = ResearchAugmenter::new(search, http_fetcher()).unwrap();

        let outcome = augmenter.research("Chatbots").await;
        assert_eq!(
            outcome,
            ResearchOutcome::Found(format!(
                "Source: {one}\nFirst source text\nSource: {two}\nSecond source\n"
            ))
        );
    }

    #[tokio::test]
    async fn only_first_two_links_are_fetched() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let search = Arc::new(FixedSearch(
            (1..=5).map(|i| format!("https://s{i}.example/")).collect(),
        ));
        let augmenter = ResearchAugmenter::new(search, fetcher.clone()).unwrap();

        let outcome = augmenter.research("anything").await;
        assert_eq!(outcome, ResearchOutcome::Empty);
        assert_eq!(
            *fetcher.urls.lock().unwrap(),
            ["https://s1.example/", "https://s2.example/"]
        );
    }

    #[tokio::test]
    async fn failing_source_does_not_drop_the_other() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blocked"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        mount_page(
            &server,
            "/ok",
            "<html><body><article>Useful text</article></body></html>",
        )
        .await;

        let ok = format!("{}/ok", server.uri());
        let blocked = format!("{}/blocked", server.uri());
        let search = Arc::new(FixedSearch(vec![blocked, ok.clone()]));
        let augmenter = ResearchAugmenter::new(search, http_fetcher()).unwrap();

        let outcome = augmenter.research("t").await;
        assert_eq!(outcome.as_prompt_text(), format!("Source: {ok}\nUseful text\n"));
    }

    #[tokio::test]
    async fn excerpt_is_truncated_to_limit() {
        let server = MockServer::start().await;
        let long = "word ".repeat(2000);
        let page = format!("<html><body><article>{long}</article></body></html>");
        mount_page(&server, "/long", &page).await;

        let url = format!("{}/long", server.uri());
        let search = Arc::new(FixedSearch(vec![url.clone()]));
        let augmenter = ResearchAugmenter::new(search, http_fetcher()).unwrap();

        let text = augmenter.research("t").await.as_prompt_text().to_string();
        let body = text
            .strip_prefix(&format!("Source: {url}\n"))
            .and_then(|rest| rest.strip_suffix('\n'))
            .unwrap();
        assert_eq!(body.chars().count(), 4000);
    }

    #[tokio::test]
    async fn oversized_config_limits_are_clamped() {
        let server = MockServer::start().await;
        let long = "word ".repeat(2000);
        let page = format!("<html><body><article>{long}</article></body></html>");
        for route in ["/a", "/b", "/c"] {
            mount_page(&server, route, &page).await;
        }

        let links: Vec<String> = ["/a", "/b", "/c"]
            .iter()
            .map(|r| format!("{}{r}", server.uri()))
            .collect();
        let search_config = SearchConfig {
            max_sources: 10,
            ..SearchConfig::default()
        };
        let research_config = ResearchConfig {
            max_excerpt_chars: 10_000,
            ..ResearchConfig::default()
        };
        let augmenter = ResearchAugmenter::with_config(
            Arc::new(FixedSearch(links.clone())),
            http_fetcher(),
            &search_config,
            &research_config,
        )
        .unwrap();

        let text = augmenter.research("t").await.as_prompt_text().to_string();
        assert_eq!(text.matches("Source: ").count(), 2);
        assert!(!text.contains(&links[2]));
        let first = text
            .strip_prefix(&format!("Source: {}\n", links[0]))
            .and_then(|rest| rest.split('\n').next())
            .unwrap();
        assert_eq!(first.chars().count(), 4000);
    }

    #[tokio::test]
    async fn search_failure_is_failed_with_empty_prompt_text() {
        let augmenter =
            ResearchAugmenter::new(Arc::new(FailingSearch), Arc::new(RecordingFetcher::default()))
                .unwrap();

        let outcome = augmenter.research("t").await;
        assert!(matches!(outcome, ResearchOutcome::Failed(ref r) if r.contains("429")));
        assert_eq!(outcome.as_prompt_text(), "");
    }

    #[tokio::test]
    async fn no_results_is_empty() {
        let augmenter = ResearchAugmenter::new(
            Arc::new(FixedSearch(vec![])),
            Arc::new(RecordingFetcher::default()),
        )
        .unwrap();
        assert_eq!(augmenter.research("t").await, ResearchOutcome::Empty);
    }
}
