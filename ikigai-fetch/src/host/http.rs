//! HTTP client with a bounded timeout and request tracing.
//!
//! Every outbound call (token exchange, activity fetch, gateway push) goes
//! through [`HttpClient::send`], so none of them can stall the poll loop
//! for longer than the configured timeout.

use reqwest::{Client, RequestBuilder, Response};
use std::error::Error as _;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::HttpError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for Ikigai.
const USER_AGENT: &str = concat!("Ikigai/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with a request timeout and tracing.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: client,
            timeout,
        })
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Starts a GET request.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.inner.get(url)
    }

    /// Starts a POST request.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.inner.post(url)
    }

    /// Starts a PUT request.
    pub fn put(&self, url: &str) -> RequestBuilder {
        self.inner.put(url)
    }

    /// Sends a request built from this client.
    ///
    /// A response with any status is `Ok`; status handling is up to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if the URL does not parse,
    /// [`HttpError::Build`] if the request cannot be built for any other
    /// reason, [`HttpError::Timeout`] if no response arrives in time, and
    /// [`HttpError::Request`] for any other transport failure.
    #[instrument(skip_all)]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, HttpError> {
        let request = request.build().map_err(|e| {
            if e.source().is_some_and(|source| source.is::<url::ParseError>()) {
                HttpError::InvalidUrl(e.to_string())
            } else {
                HttpError::Build(e.to_string())
            }
        })?;

        debug!(method = %request.method(), url = %request.url(), "Sending request");

        let response = self.inner.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(self.timeout)
            } else {
                HttpError::Request(e)
            }
        })?;

        debug!(status = %response.status(), "Response received");
        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_custom_timeout() {
        let client = HttpClient::with_timeout(Duration::from_millis(250)).unwrap();
        assert_eq!(client.timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = HttpClient::new().unwrap();
        let result = client.send(client.get("not-a-valid-url")).await;
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_invalid_header_is_build_error() {
        let client = HttpClient::new().unwrap();
        let request = client
            .get("http://localhost:9091/metrics")
            .header("x-job", "fitbit\napi");
        let result = client.send(request).await;
        assert!(matches!(result, Err(HttpError::Build(_))));
    }
}
