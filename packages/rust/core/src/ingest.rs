//! Seed the Article Store from a blog listing page.
//!
//! Fetch the listing, pick the candidates that approximate the page's oldest
//! posts, then fetch each detail page and create a pending article for every
//! title the store does not already hold.

use tracing::{error, info, instrument, warn};
use url::Url;

use postforge_extract::{CandidateExtractor, ContentExtractor, PageFetcher, select_oldest};
use postforge_shared::{Candidate, IngestConfig, NewArticle, PostforgeError, Result};
use postforge_store::ArticleStore;

/// Counts for one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Candidates extracted from the listing page.
    pub found: usize,
    /// Candidates kept after dedup and selection.
    pub selected: usize,
    pub created: usize,
    /// Selected candidates whose exact title already exists.
    pub skipped_existing: usize,
    pub failed: usize,
}

/// Progress callback for reporting ingestion status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each selected candidate is handled.
    fn candidate(&self, title: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, report: &IngestReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn candidate(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &IngestReport) {}
}

enum CandidateOutcome {
    Created,
    Exists,
}

/// Run one ingestion pass against `config.source_url`.
///
/// Only a bad source URL or an unreachable listing page is an error.
/// Per-candidate failures are logged and counted.
#[instrument(skip_all, fields(source = %config.source_url, limit = config.limit))]
pub async fn ingest(
    config: &IngestConfig,
    store: &dyn ArticleStore,
    fetcher: &dyn PageFetcher,
    progress: &dyn ProgressReporter,
) -> Result<IngestReport> {
    let base = Url::parse(&config.source_url).map_err(|e| {
        PostforgeError::config(format!("invalid source URL {}: {e}", config.source_url))
    })?;

    progress.phase("Fetching listing page");
    let listing_html = fetcher.fetch(base.as_str()).await?;

    let listing = CandidateExtractor::new()?.extract(&listing_html, &base);
    let mut report = IngestReport {
        found: listing.candidates.len(),
        ..Default::default()
    };

    if listing.candidates.is_empty() {
        error!("no articles found on listing page");
        progress.done(&report);
        return Ok(report);
    }

    let selected = select_oldest(listing.candidates, config.limit);
    report.selected = selected.len();
    info!(
        found = report.found,
        selected = report.selected,
        strategy = listing.strategy.as_deref().unwrap_or("none"),
        "candidates selected"
    );

    progress.phase("Importing articles");
    let content = ContentExtractor::ingestion()?;
    let total = selected.len();
    for (i, candidate) in selected.iter().enumerate() {
        progress.candidate(&candidate.title, i + 1, total);
        match import_candidate(candidate, store, fetcher, &content).await {
            Ok(CandidateOutcome::Created) => report.created += 1,
            Ok(CandidateOutcome::Exists) => report.skipped_existing += 1,
            Err(e) => {
                warn!(
                    title = %candidate.title,
                    link = %candidate.link,
                    error = %e,
                    "failed to import article"
                );
                report.failed += 1;
            }
        }
    }

    info!(
        created = report.created,
        skipped = report.skipped_existing,
        failed = report.failed,
        "ingestion finished"
    );
    progress.done(&report);
    Ok(report)
}

async fn import_candidate(
    candidate: &Candidate,
    store: &dyn ArticleStore,
    fetcher: &dyn PageFetcher,
    content: &ContentExtractor,
) -> Result<CandidateOutcome> {
    if store.title_exists(&candidate.title).await? {
        info!(title = %candidate.title, "article already exists, skipping");
        return Ok(CandidateOutcome::Exists);
    }

    let html = fetcher.fetch(&candidate.link).await?;
    let body = content.extract(&html).into_content();

    let created = store
        .create_article(&NewArticle::pending(candidate.title.clone(), body))
        .await?;
    info!(id = %created.id, title = %created.title, "article created");
    Ok(CandidateOutcome::Created)
}
