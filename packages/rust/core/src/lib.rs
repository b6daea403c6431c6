//! Enrichment pipeline for postforge.
//!
//! This crate ties the store, research and generation together:
//! - [`worker`]: the long-running pending → completed loop
//! - [`synthesis`]: rewrite prompt and single generation call
//! - [`llm`]: the [`TextGenerator`] seam and the Gemini client
//! - [`ingest`]: seeding the store from a blog listing page
//! - [`cancel`]: cooperative shutdown for the worker

pub mod cancel;
pub mod ingest;
pub mod llm;
pub mod synthesis;
pub mod worker;

pub use cancel::CancellationToken;
pub use ingest::{IngestReport, ProgressReporter, SilentProgress, ingest};
pub use llm::{GeminiClient, TextGenerator};
pub use synthesis::{Synthesizer, build_prompt};
pub use worker::{Clock, CycleReport, ItemOutcome, TokioClock, Worker, WorkerState};
