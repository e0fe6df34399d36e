//! Prometheus Pushgateway client.
//!
//! Pushes use `PUT <base>/metrics/job/<job>`, which replaces every metric
//! previously pushed under the same grouping key.

use async_trait::async_trait;
use ikigai_core::PushError;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::host::http::HttpClient;
use crate::registry::MetricRegistry;

/// Default job name for activity metrics.
pub const DEFAULT_JOB: &str = "fitbit_api";

/// Content type of the text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

// ============================================================================
// Publisher Trait
// ============================================================================

/// A destination for per-tick metric registries.
#[async_trait]
pub trait MetricsPublisher: Send + Sync {
    /// Pushes the registry, replacing the previous push.
    async fn push(&self, registry: &MetricRegistry) -> Result<(), PushError>;
}

// ============================================================================
// Push Gateway
// ============================================================================

/// Pushgateway client bound to one job.
#[derive(Debug, Clone)]
pub struct PushGateway {
    http: HttpClient,
    push_url: Url,
    job: String,
}

impl PushGateway {
    /// Creates a client for `base_url` (e.g. `http://localhost:9091`).
    ///
    /// # Errors
    ///
    /// Returns [`PushError::InvalidUrl`] if the base URL cannot be parsed
    /// or the job name is empty.
    pub fn new(http: HttpClient, base_url: &str, job: &str) -> Result<Self, PushError> {
        if job.is_empty() {
            return Err(PushError::InvalidUrl("job name must not be empty".to_string()));
        }

        let mut push_url =
            Url::parse(base_url).map_err(|e| PushError::InvalidUrl(format!("{base_url}: {e}")))?;

        push_url
            .path_segments_mut()
            .map_err(|()| PushError::InvalidUrl(format!("{base_url}: cannot be a base")))?
            .pop_if_empty()
            .extend(["metrics", "job", job]);

        Ok(Self {
            http,
            push_url,
            job: job.to_string(),
        })
    }

    /// Returns the URL pushes are sent to.
    pub fn push_url(&self) -> &Url {
        &self.push_url
    }

    /// Returns the job name.
    pub fn job(&self) -> &str {
        &self.job
    }
}

#[async_trait]
impl MetricsPublisher for PushGateway {
    #[instrument(skip(self, registry), fields(job = %self.job, metrics = registry.len()))]
    async fn push(&self, registry: &MetricRegistry) -> Result<(), PushError> {
        let request = self
            .http
            .put(self.push_url.as_str())
            .header(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)
            .body(registry.encode());

        let response = self
            .http
            .send(request)
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gateway rejected push");
            return Err(PushError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Metrics pushed");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
