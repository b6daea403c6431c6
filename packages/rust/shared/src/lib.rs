//! Shared types, error model, and configuration for postforge.
//!
//! This crate is the foundation depended on by all other postforge crates.
//! It provides:
//! - [`PostforgeError`]: the unified error type
//! - Domain types ([`Article`], [`Candidate`], [`ResearchSnippet`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BROWSER_USER_AGENT, IngestConfig, LlmConfig, MAX_EXCERPT_CHARS_CAP,
    MAX_SOURCES_CAP, ResearchConfig, SearchConfig, StoreConfig, WorkerConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_api_key,
};
pub use error::{PostforgeError, Result};
pub use types::{
    Article, ArticleId, ArticleStatus, ArticleUpdate, Candidate, NewArticle, ResearchSnippet,
};
