//! Per-tick metric registry.
//!
//! A [`MetricRegistry`] starts empty every tick, collects the mapped
//! observations, and encodes them in the Prometheus text exposition format
//! (version 0.0.4) for the gateway push.
//!
//! ```text
//! # HELP fitbit_calories_total Total number of calories
//! # TYPE fitbit_calories_total gauge
//! fitbit_calories_total 2200
//! ```

use std::collections::HashSet;
use std::fmt::Write;

use ikigai_core::{MetricObservation, PushError};

/// A set of uniquely named metrics for one push.
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    namespace: Option<String>,
    metrics: Vec<MetricObservation>,
    names: HashSet<String>,
}

impl MetricRegistry {
    /// Creates an empty registry without a namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry that prefixes every name with
    /// `<namespace>_`. An empty namespace means no prefix.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            namespace: (!namespace.is_empty()).then_some(namespace),
            ..Self::default()
        }
    }

    /// Returns the fully qualified name for a metric.
    pub fn qualified_name(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}_{name}"),
            None => name.to_string(),
        }
    }

    /// Registers an observation.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::InvalidMetric`] if the qualified name is not a
    /// valid metric name and [`PushError::DuplicateMetric`] if it is already
    /// registered.
    pub fn register(&mut self, observation: MetricObservation) -> Result<(), PushError> {
        let name = self.qualified_name(&observation.name);

        if !is_valid_metric_name(&name) {
            return Err(PushError::InvalidMetric(name));
        }
        if !self.names.insert(name.clone()) {
            return Err(PushError::DuplicateMetric(name));
        }

        self.metrics.push(MetricObservation { name, ..observation });
        Ok(())
    }

    /// Registers every observation, stopping at the first error.
    ///
    /// # Errors
    ///
    /// See [`MetricRegistry::register`].
    pub fn register_all(
        &mut self,
        observations: impl IntoIterator<Item = MetricObservation>,
    ) -> Result<(), PushError> {
        observations
            .into_iter()
            .try_for_each(|observation| self.register(observation))
    }

    /// Returns the number of registered metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Returns the registered metrics with qualified names, in order.
    pub fn metrics(&self) -> &[MetricObservation] {
        &self.metrics
    }

    /// Encodes the registry in the text exposition format.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for metric in &self.metrics {
            // Writing to a String cannot fail.
            let _ = writeln!(out, "# HELP {} {}", metric.name, escape_help(&metric.help));
            let _ = writeln!(out, "# TYPE {} gauge", metric.name);
            let _ = writeln!(out, "{} {}", metric.name, format_value(metric.value));
        }
        out
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Checks a name against `[a-zA-Z_:][a-zA-Z0-9_:]*`.
fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_' || first == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
