//! Error types for postforge.
//!
//! Library crates use [`PostforgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all postforge operations.
#[derive(Debug, thiserror::Error)]
pub enum PostforgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching pages or calling a provider.
    #[error("network error: {0}")]
    Network(String),

    /// HTML parsing, selector, or response decoding error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Article store returned an unexpected response.
    #[error("store error: {0}")]
    Store(String),

    /// Article store has no article with the requested id.
    #[error("article {0} not found")]
    NotFound(String),

    /// Request rejected by the store or a local validation check.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Search provider failure.
    #[error("search error: {0}")]
    Search(String),

    /// Generative text provider failure (quota, timeout, malformed response).
    #[error("generation error: {0}")]
    Generation(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PostforgeError>;

impl PostforgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
