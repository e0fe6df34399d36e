//! Activity-to-metric mapping.
//!
//! [`ACTIVITY_METRICS`] is the only place metric names and help texts are
//! defined. [`map_to_metrics`] walks it in order, so the output order is the
//! table order on every call.

use crate::models::{ActivitySummary, MetricObservation};

/// One row of the mapping table.
#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    /// Metric name, without namespace.
    pub name: &'static str,
    /// Help text.
    pub help: &'static str,
    /// Extracts the source value; `None` means the metric is omitted.
    pub source: fn(&ActivitySummary) -> Option<u32>,
}

/// The activity mapping table, in publication order.
pub const ACTIVITY_METRICS: &[MetricSpec] = &[
    MetricSpec {
        name: "calories_total",
        help: "Total number of calories",
        source: |s| Some(s.calories_out),
    },
    MetricSpec {
        name: "calories_active_total",
        help: "Number of calories above BMR",
        source: |s| Some(s.activity_calories),
    },
    MetricSpec {
        name: "calories_bmr_total",
        help: "Number of BMR calories",
        source: |s| Some(s.calories_bmr),
    },
    MetricSpec {
        name: "minutes_low_activity_total",
        help: "Number of minutes spent in low activity",
        source: |s| Some(s.fairly_active_minutes),
    },
    MetricSpec {
        name: "minutes_medium_activity_total",
        help: "Number of minutes spent in medium activity",
        source: |s| Some(s.lightly_active_minutes),
    },
    MetricSpec {
        name: "minutes_high_activity_total",
        help: "Number of minutes spent in high activity",
        source: |s| Some(s.very_active_minutes),
    },
    MetricSpec {
        name: "minutes_sedentary_total",
        help: "Number of sedentary minutes spent",
        source: |s| Some(s.sedentary_minutes),
    },
    MetricSpec {
        name: "steps_total",
        help: "Number of steps taken",
        source: |s| s.steps,
    },
    MetricSpec {
        name: "steps_goal",
        help: "Daily steps goal",
        source: |s| s.goals.map(|g| g.steps),
    },
    MetricSpec {
        name: "calories_goal",
        help: "Daily calories goal",
        source: |s| s.goals.map(|g| g.calories_out),
    },
];

/// Maps a summary to its ordered metric observations.
///
/// Always emits the seven calorie and minute metrics, then `steps_total`
/// when a step count is present, then both goal metrics when goals are
/// present.
pub fn map_to_metrics(summary: &ActivitySummary) -> Vec<MetricObservation> {
    ACTIVITY_METRICS
        .iter()
        .filter_map(|spec| {
            (spec.source)(summary)
                .map(|value| MetricObservation::new(spec.name, spec.help, f64::from(value)))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
