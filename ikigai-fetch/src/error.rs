//! Fetch error types.

use std::time::Duration;
use thiserror::Error;

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be built, e.g. an invalid header value.
    #[error("Invalid request: {0}")]
    Build(String),

    /// Timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}
