//! Rewrite prompt construction and the single generation call per article.

use std::sync::Arc;

use tracing::{debug, instrument};

use postforge_shared::Result;

use crate::llm::TextGenerator;

/// Build the rewrite prompt. `research` may be empty.
pub fn build_prompt(original: &str, research: &str) -> String {
    format!(
        "Rewrite this article to be comprehensive.\n\
         Original: \"{original}\"\n\
         Research: {research}\n\
         Requirements: Professional tone, HTML formatting, List sources at end."
    )
}

pub struct Synthesizer {
    generator: Arc<dyn TextGenerator>,
}

impl Synthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// One generation call; the provider's text is returned unchanged.
    ///
    /// Provider errors are returned as-is and not retried.
    #[instrument(skip_all, fields(original_len = original.len(), research_len = research.len()))]
    pub async fn rewrite(&self, original: &str, research: &str) -> Result<String> {
        let prompt = build_prompt(original, research);
        let text = self.generator.generate(&prompt).await?;
        debug!(len = text.len(), "article rewritten");
        Ok(text)
    }
}
