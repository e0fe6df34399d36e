//! Error taxonomy shared across Ikigai crates.
//!
//! Every error a poll tick can hit falls in one of three families:
//!
//! - [`AuthError`] - the OAuth2 token exchange or refresh failed
//! - [`ApiError`] - the activity request failed (tagged by [`ApiErrorKind`])
//! - [`PushError`] - registering or pushing metrics to the gateway failed

use std::fmt;
use thiserror::Error;

// ============================================================================
// Auth Error
// ============================================================================

/// Error type for OAuth2 token operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token request could not be sent or no response arrived.
    #[error("token request failed: {0}")]
    Transport(String),

    /// The token endpoint answered with a non-success status.
    #[error("token endpoint returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// The token response could not be decoded.
    #[error("malformed token response: {0}")]
    Malformed(String),

    /// The access token expired and there is no refresh token to renew it.
    #[error("access token expired and no refresh token is available")]
    NoRefreshToken,
}

// ============================================================================
// API Error
// ============================================================================

/// Classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Request not sent or no response received.
    Transport,
    /// Response status was not 200.
    HttpStatus,
    /// Body was not valid JSON or did not match the schema.
    Decode,
    /// A valid bearer token could not be obtained.
    Auth,
}

impl ApiErrorKind {
    /// Returns a stable identifier for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::HttpStatus => "http_status",
            Self::Decode => "decode",
            Self::Auth => "auth",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for activity API calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Request could not be sent or no response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response status was not 200. The body is discarded.
    #[error("unexpected HTTP status {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
    },

    /// Body is not valid JSON or does not match the expected schema.
    #[error("decode error: {0}")]
    Decode(String),

    /// Token renewal failed before the request was sent.
    #[error("authorization failed: {0}")]
    Auth(#[from] AuthError),
}

impl ApiError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Transport(_) => ApiErrorKind::Transport,
            Self::HttpStatus { .. } => ApiErrorKind::HttpStatus,
            Self::Decode(_) => ApiErrorKind::Decode,
            Self::Auth(_) => ApiErrorKind::Auth,
        }
    }

    /// Returns the HTTP status code for [`ApiError::HttpStatus`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// Push Error
// ============================================================================

/// Error type for metric registration and gateway pushes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// The push could not be sent or no response arrived.
    #[error("push request failed: {0}")]
    Transport(String),

    /// The gateway answered with a non-success status.
    #[error("gateway returned HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// Metric name is not a valid Prometheus metric name.
    #[error("invalid metric name: {0}")]
    InvalidMetric(String),

    /// Metric name was registered twice in the same registry.
    #[error("duplicate metric: {0}")]
    DuplicateMetric(String),

    /// Gateway URL could not be built.
    #[error("invalid gateway URL: {0}")]
    InvalidUrl(String),
}

// ============================================================================
// Tests
// ============================================================================
