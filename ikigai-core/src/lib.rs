// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Ikigai Core
//!
//! Core types, metric mapping, and traits shared by the Ikigai crates.
//!
//! - Domain models ([`ActivitySummary`], [`Goals`], [`MetricObservation`])
//! - The activity-to-metric mapping table ([`mapper`])
//! - The error taxonomy for authorization, API calls, and gateway pushes
//! - The [`ActivitySource`] capability trait implemented by providers
//!
//! ## Example
//!
//! ```
//! use ikigai_core::{map_to_metrics, ActivitySummary};
//!
//! let summary = ActivitySummary {
//!     calories_out: 2200,
//!     ..ActivitySummary::default()
//! };
//!
//! let metrics = map_to_metrics(&summary);
//! assert_eq!(metrics[0].name, "calories_total");
//! assert_eq!(metrics[0].value, 2200.0);
//! ```

pub mod error;
pub mod mapper;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::{ApiError, ApiErrorKind, AuthError, PushError};

// Re-export mapping
pub use mapper::{map_to_metrics, MetricSpec, ACTIVITY_METRICS};

// Re-export all model types
pub use models::{ActivitySummary, Goals, MetricObservation};

// Re-export traits
pub use traits::ActivitySource;
