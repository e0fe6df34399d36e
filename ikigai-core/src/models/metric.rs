//! Metric observation type.

use serde::Serialize;

/// A single named metric value.
///
/// Observations are created and discarded within one poll tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricObservation {
    /// Metric name, without any namespace prefix.
    pub name: String,
    /// Help text published alongside the metric.
    pub help: String,
    /// Observed value.
    pub value: f64,
}

impl MetricObservation {
    /// Creates a new observation.
    pub fn new(name: impl Into<String>, help: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            value,
        }
    }
}
