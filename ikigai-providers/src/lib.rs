// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Ikigai Providers
//!
//! Activity provider implementations for Ikigai.
//!
//! Each provider module includes:
//!
//! - **OAuth**: Credential exchange and token renewal
//! - **API**: Authenticated client implementing
//!   [`ActivitySource`](ikigai_core::ActivitySource)
//! - **Parser**: Response decoding into core types
//!
//! ## Usage
//!
//! ```ignore
//! use ikigai_fetch::HttpClient;
//! use ikigai_providers::fitbit::{Credentials, FitbitApiClient, TokenSource};
//!
//! let http = HttpClient::new()?;
//! let tokens = TokenSource::initialize(http.clone(), &credentials).await?;
//! let client = FitbitApiClient::new(http, tokens);
//!
//! let summary = client.daily_activity_summary().await?;
//! ```

pub mod fitbit;
