//! Fixed-interval poll scheduler.
//!
//! Each tick fetches today's activity, maps it to metrics, registers them
//! in a fresh [`MetricRegistry`], and pushes the registry. A failing tick
//! is logged and skipped; the loop itself never stops.

use std::time::{Duration, Instant};

use ikigai_core::{map_to_metrics, ActivitySource, ApiError, PushError};
use thiserror::Error;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, instrument};

use crate::gateway::MetricsPublisher;
use crate::registry::MetricRegistry;

// ============================================================================
// Tick Types
// ============================================================================

/// Why a tick ended early.
#[derive(Debug, Error)]
pub enum TickError {
    /// Fetching the activity summary failed; nothing was pushed.
    #[error("activity fetch failed: {0}")]
    Api(#[from] ApiError),

    /// Registering or pushing the metrics failed.
    #[error("metrics push failed: {0}")]
    Push(#[from] PushError),
}

/// Summary of a successful tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Number of metrics pushed.
    pub metrics_pushed: usize,
}

// ============================================================================
// Poll Scheduler
// ============================================================================

/// Drives the fetch, map, and push cycle.
pub struct PollScheduler<S, P> {
    source: S,
    publisher: P,
    namespace: String,
    ticks: u64,
}

impl<S: ActivitySource, P: MetricsPublisher> PollScheduler<S, P> {
    /// Creates a scheduler with no metric namespace.
    pub fn new(source: S, publisher: P) -> Self {
        Self {
            source,
            publisher,
            namespace: String::new(),
            ticks: 0,
        }
    }

    /// Sets the namespace prefixed to every metric name.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Returns the number of ticks started so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs a single tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Api`] if the activity fetch failed, in which
    /// case the publisher was not called, and [`TickError::Push`] if the
    /// metrics could not be registered or pushed.
    #[instrument(skip(self), fields(tick = self.ticks + 1))]
    pub async fn run_tick(&mut self) -> Result<TickReport, TickError> {
        self.ticks += 1;

        let summary = self.source.daily_activity_summary().await?;
        let observations = map_to_metrics(&summary);
        debug!(count = observations.len(), "Mapped activity summary");

        let mut registry = MetricRegistry::with_namespace(self.namespace.as_str());
        registry.register_all(observations)?;

        self.publisher.push(&registry).await?;

        Ok(TickReport {
            metrics_pushed: registry.len(),
        })
    }

    /// Runs ticks every `period`, forever.
    ///
    /// The first tick fires one full period after the call. A tick that
    /// overruns its slot delays the next one; missed ticks are never
    /// replayed.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub async fn run(&mut self, period: Duration) {
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period = ?period, "Poll scheduler started");

        loop {
            ticker.tick().await;

            let started = Instant::now();
            let result = self.run_tick().await;
            let elapsed_ms = started.elapsed().as_millis();

            match result {
                Ok(report) => info!(
                    tick = self.ticks,
                    metrics = report.metrics_pushed,
                    elapsed_ms,
                    "Pushed activity metrics"
                ),
                Err(TickError::Api(e)) => error!(
                    tick = self.ticks,
                    kind = %e.kind(),
                    status = e.status(),
                    error = %e,
                    "Activity fetch failed, skipping tick"
                ),
                Err(TickError::Push(e)) => error!(
                    tick = self.ticks,
                    error = %e,
                    "Metrics push failed, skipping tick"
                ),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
