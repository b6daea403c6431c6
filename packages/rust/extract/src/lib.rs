//! HTML fetching and heuristic extraction.
//!
//! This crate provides:
//! - [`strategies`]: cascading candidate listing for blog index pages
//! - [`content`]: ordered content-container extraction with a "not found" sentinel
//! - [`text`]: whitespace collapsing and character-bounded truncation
//! - [`fetch`]: the [`PageFetcher`] seam and its HTTP implementation

pub mod content;
pub mod fetch;
pub mod strategies;
pub mod text;

pub use content::{
    CONTENT_NOT_FOUND, ContentExtractor, ContentFormat, Extracted, INGESTION_SELECTORS,
    RESEARCH_SELECTORS,
};
pub use fetch::{HttpFetcher, PageFetcher};
pub use strategies::{
    CandidateExtractor, CandidateListing, CandidateStrategy, ContainerStrategy,
    DEFAULT_SELECTION_LIMIT, HeadingLinkStrategy, select_oldest,
};
pub use text::{collapse_whitespace, truncate_chars};

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn listing_url() -> Url {
        Url::parse("https://blog.example.com/blogs/").unwrap()
    }

    // -----------------------------------------------------------------------
    // Candidate listing
    // -----------------------------------------------------------------------

    #[test]
    fn cards_listing_uses_container_strategy() {
        let extractor = CandidateExtractor::new().unwrap();
        let listing = extractor.extract(&load_fixture("listing_cards.html"), &listing_url());

        assert_eq!(listing.strategy.as_deref(), Some("containers"));
        assert_eq!(listing.candidates.len(), 7);
        assert_eq!(listing.candidates[0].title, "Post number 1");
        assert_eq!(
            listing.candidates[0].link,
            "https://blog.example.com/blogs/post-1/"
        );
        // The sponsored card links off-site and is dropped
        assert!(!listing.candidates.iter().any(|c| c.link.contains("ads.example.net")));
    }

    #[test]
    fn seven_primary_matches_select_last_five_reversed() {
        let extractor = CandidateExtractor::new().unwrap();
        let listing = extractor.extract(&load_fixture("listing_cards.html"), &listing_url());
        let selected = select_oldest(listing.candidates, DEFAULT_SELECTION_LIMIT);

        let titles: Vec<&str> = selected.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Post number 7",
                "Post number 6",
                "Post number 5",
                "Post number 4",
                "Post number 3"
            ]
        );
    }

    #[test]
    fn headings_listing_falls_back_without_site_filter() {
        let extractor = CandidateExtractor::new().unwrap();
        let listing = extractor.extract(&load_fixture("listing_headings.html"), &listing_url());

        assert_eq!(listing.strategy.as_deref(), Some("heading-links"));
        assert_eq!(listing.candidates.len(), 5);
        assert!(listing.candidates.iter().any(|c| c.link.contains("partner.example.org")));
        assert!(listing
            .candidates
            .iter()
            .any(|c| c.link == "https://blog.example.com/local/story-4"));
    }

    #[test]
    fn headings_listing_dedups_and_reverses() {
        let extractor = CandidateExtractor::new().unwrap();
        let listing = extractor.extract(&load_fixture("listing_headings.html"), &listing_url());
        let selected = select_oldest(listing.candidates, DEFAULT_SELECTION_LIMIT);

        let titles: Vec<&str> = selected.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Story 4", "Story 3", "Story 2", "Story 1"]);
    }

    #[test]
    fn malformed_container_is_skipped_not_fatal() {
        let html = r#"<html><body>
            <article><h2>No link here</h2></article>
            <article><a href="/blogs/x/">No heading here</a></article>
            <article><h2>   </h2><a href="/blogs/blank/">blank title</a></article>
            <article><h2>Broken href</h2><a href="http://[::1">x</a></article>
            <article><h2>Good one</h2><a href="/blogs/good/">read</a></article>
        </body></html>"#;
        let extractor = CandidateExtractor::new().unwrap();
        let listing = extractor.extract(html, &listing_url());

        assert_eq!(listing.strategy.as_deref(), Some("containers"));
        assert_eq!(listing.candidates.len(), 1);
        assert_eq!(listing.candidates[0].title, "Good one");
    }

    // -----------------------------------------------------------------------
    // Content extraction
    // -----------------------------------------------------------------------

    #[test]
    fn detail_page_extracts_entry_content() {
        let extractor = ContentExtractor::ingestion().unwrap();
        let content = extractor.extract(&load_fixture("detail.html")).into_content();

        assert!(content.contains("Chatbots answer questions"));
        assert!(content.contains("<li>Faster replies</li>"));
        assert!(!content.contains("Copyright"));
        assert!(!content.contains("<h1>"));
    }

    #[test]
    fn detail_page_research_text_is_plain() {
        let extractor = ContentExtractor::research().unwrap();
        let text = collapse_whitespace(
            &extractor.extract(&load_fixture("detail.html")).into_content_or_empty(),
        );
        assert!(text.starts_with("Post number 1 Chatbots answer questions"));
        assert!(!text.contains('\n'));
    }
}
