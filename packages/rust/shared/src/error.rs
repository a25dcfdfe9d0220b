//! Error types for lipidscrape.
//!
//! Library crates use [`LipidScrapeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Page-level variants ([`LipidScrapeError::Fetch`], [`LipidScrapeError::Parse`])
//! abort the crawl of a source. Structure-file variants
//! ([`LipidScrapeError::Remote`], [`LipidScrapeError::EmptyArtifact`],
//! [`LipidScrapeError::Structure`]) are caught per record by the formula deriver.

use std::path::PathBuf;

/// Top-level error type for all lipidscrape operations.
#[derive(Debug, thiserror::Error)]
pub enum LipidScrapeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Listing page could not be fetched or rendered.
    #[error("fetch error at {url}: {message}")]
    Fetch { url: String, message: String },

    /// Page content did not have the expected structure.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Structure-file download failed.
    #[error("remote error at {url}: {message}")]
    Remote { url: String, message: String },

    /// Structure-file download returned zero bytes.
    #[error("empty artifact downloaded from {url}")]
    EmptyArtifact { url: String },

    /// Structure file could not be analyzed.
    #[error("structure error: {message}")]
    Structure { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Tabular export failure.
    #[error("export error: {0}")]
    Export(String),

    /// Data validation error (runaway pagination, invalid input, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LipidScrapeError>;

impl LipidScrapeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a fetch error for the given page.
    pub fn fetch(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a remote error for a structure-file download.
    pub fn remote(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Remote {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create a structure error from any displayable message.
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure {
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

    /// Whether this error only affects a single record's structure summary.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            Self::Remote { .. } | Self::EmptyArtifact { .. } | Self::Structure { .. }
        )
    }
}
