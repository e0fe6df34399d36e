//! Domain models for Ikigai.
//!
//! - [`activity`] - Daily activity summary and goals
//! - [`metric`] - Flat metric observations pushed to the gateway

mod activity;
mod metric;

pub use activity::{ActivitySummary, Goals};
pub use metric::MetricObservation;
