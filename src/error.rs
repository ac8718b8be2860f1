//! Error types for crawl operations
//!
//! The taxonomy distinguishes failures the fetchers retry locally from
//! failures that consume a page attempt, and from setup-time errors that
//! surface to the caller of `crawl`.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for crawl operations
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Error types for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// DNS, TCP, TLS, or proxy failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-200 HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Request or navigation exceeded its budget
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Browser navigation raised
    #[error("render failed: {0}")]
    Render(String),

    /// DOM parse failure of an otherwise valid body
    #[error("parse failed: {0}")]
    Parse(String),

    /// Invalid configuration or start-URL list
    #[error("configuration error: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CrawlError {
    /// Whether the fetcher's retry budget applies to this error
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status(_) | Self::Timeout(_)
        )
    }
}

impl From<reqwest::Error> for CrawlError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(Duration::from_secs(0))
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<anyhow::Error> for CrawlError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} preserves the full context chain
        Self::Other(format!("{err:#}"))
    }
}
