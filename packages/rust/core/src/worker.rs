//! The enrichment worker: list pending articles, research and rewrite each
//! one, persist the result, pace, idle, repeat.
//!
//! One cycle moves through [`WorkerState::Listing`], then
//! [`WorkerState::ProcessingItem`] for each pending article in listing order,
//! and ends in [`WorkerState::Idle`]. Every network call is issued one at a
//! time. A failure while handling one article is recorded as
//! [`ItemOutcome::Failed`] and the cycle moves on; the article stays pending
//! and is retried whole on the next cycle. A failed listing ends the cycle
//! without processing anything.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use postforge_research::{ResearchAugmenter, ResearchOutcome};
use postforge_shared::{Article, WorkerConfig};
use postforge_store::ArticleStore;

use crate::cancel::CancellationToken;
use crate::synthesis::Synthesizer;

/// Source of delays. Injected so tests never really sleep.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real time via `tokio::time::sleep`.
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Listing,
    /// Index into the pending list of the current cycle.
    ProcessingItem(usize),
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Completed,
    Failed(String),
}

/// Counts for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Articles returned by the listing call.
    pub listed: usize,
    /// Of those, articles with `status = pending`.
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
    /// The listing call failed; nothing was processed.
    pub listing_failed: bool,
}

pub struct Worker {
    store: Arc<dyn ArticleStore>,
    augmenter: ResearchAugmenter,
    synthesizer: Synthesizer,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    pacing: Duration,
    idle_interval: Duration,
    state: WorkerState,
}

impl Worker {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        augmenter: ResearchAugmenter,
        synthesizer: Synthesizer,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            store,
            augmenter,
            synthesizer,
            clock: Arc::new(TokioClock),
            cancel: CancellationToken::new(),
            pacing: config.pacing(),
            idle_interval: config.idle_interval(),
            state: WorkerState::Idle,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Run cycles with an idle wait between them until cancelled.
    pub async fn run(&mut self) {
        info!(
            pacing_ms = self.pacing.as_millis() as u64,
            idle_ms = self.idle_interval.as_millis() as u64,
            "worker started"
        );

        while !self.cancel.is_cancelled() {
            self.run_cycle().await;
            if self.pause(self.idle_interval).await {
                break;
            }
        }

        self.state = WorkerState::Idle;
        info!("worker stopped");
    }

    /// One Listing → ProcessingItem(0..n) → Idle pass.
    #[instrument(skip_all)]
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.state = WorkerState::Listing;
        let mut report = CycleReport::default();

        let articles = match self.store.list_articles().await {
            Ok(articles) => articles,
            Err(e) => {
                error!(error = %e, "failed to list articles");
                report.listing_failed = true;
                self.state = WorkerState::Idle;
                return report;
            }
        };

        report.listed = articles.len();
        let pending: Vec<Article> = articles.into_iter().filter(Article::is_pending).collect();
        report.pending = pending.len();

        if pending.is_empty() {
            debug!("no pending articles");
            self.state = WorkerState::Idle;
            return report;
        }

        info!(pending = pending.len(), "processing pending articles");

        for (index, article) in pending.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(remaining = pending.len() - index, "cancelled between articles");
                break;
            }

            self.state = WorkerState::ProcessingItem(index);
            match self.process(article).await {
                ItemOutcome::Completed => report.completed += 1,
                ItemOutcome::Failed(_) => report.failed += 1,
            }

            if self.pause(self.pacing).await {
                break;
            }
        }

        info!(
            pending = report.pending,
            completed = report.completed,
            failed = report.failed,
            "cycle finished"
        );
        self.state = WorkerState::Idle;
        report
    }

    /// Research, rewrite and persist one article.
    #[instrument(skip_all, fields(id = %article.id, title = %article.title))]
    async fn process(&self, article: &Article) -> ItemOutcome {
        let research = self.augmenter.research(&article.title).await;
        match &research {
            ResearchOutcome::Found(text) => debug!(len = text.len(), "using research"),
            ResearchOutcome::Empty => debug!("no research found"),
            ResearchOutcome::Failed(reason) => warn!(%reason, "research unavailable"),
        }

        let content = match self
            .synthesizer
            .rewrite(&article.original_content, research.as_prompt_text())
            .await
        {
            Ok(content) => content,
            Err(e) => {
                error!(error = %e, "rewrite failed, article stays pending");
                return ItemOutcome::Failed(e.to_string());
            }
        };

        if let Err(e) = self.store.update_article(article.id, &content).await {
            error!(error = %e, "failed to save rewrite, article stays pending");
            return ItemOutcome::Failed(e.to_string());
        }

        info!("article completed");
        ItemOutcome::Completed
    }

    /// Sleep for `duration` unless cancelled first. Returns `true` if cancelled.
    async fn pause(&self, duration: Duration) -> bool {
        if self.cancel.is_cancelled() {
            return true;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => true,
            _ = self.clock.sleep(duration) => self.cancel.is_cancelled(),
        }
    }
}
