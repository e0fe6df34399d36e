// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Ikigai Fetch
//!
//! HTTP plumbing, Pushgateway publishing, and poll scheduling for Ikigai.
//!
//! ## Host APIs
//!
//! - [`host::http`] - HTTP client with a bounded timeout and request tracing
//!
//! ## Publishing
//!
//! - [`registry::MetricRegistry`] - Per-tick metric set, encoded in the
//!   Prometheus text exposition format
//! - [`gateway::PushGateway`] - Pushes a registry under a job name,
//!   replacing the previous push for that job
//!
//! ## Scheduling
//!
//! - [`scheduler::PollScheduler`] - Fixed-interval fetch, map, and push loop
//!
//! ## Example
//!
//! ```ignore
//! use ikigai_fetch::{HttpClient, PollScheduler, PushGateway};
//!
//! let http = HttpClient::new()?;
//! let gateway = PushGateway::new(http, "http://localhost:9091", "fitbit_api")?;
//! let mut scheduler = PollScheduler::new(fitbit_client, gateway);
//!
//! scheduler.run(Duration::from_secs(60)).await;
//! ```

pub mod error;
pub mod gateway;
pub mod host;
pub mod registry;
pub mod scheduler;

// Errors
pub use error::HttpError;

// Host APIs
pub use host::http::HttpClient;

// Publishing
pub use gateway::{MetricsPublisher, PushGateway, DEFAULT_JOB, EXPOSITION_CONTENT_TYPE};
pub use registry::MetricRegistry;

// Scheduling
pub use scheduler::{PollScheduler, TickError, TickReport};
