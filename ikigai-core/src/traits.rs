//! Trait definitions for Ikigai.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::ActivitySummary;

/// A source of daily activity summaries.
///
/// Implementors are responsible for:
/// - Authenticating with the provider's API
/// - Fetching today's activity
/// - Classifying failures into an [`ApiError`]
///
/// The poll scheduler only sees this trait, so tests can swap in a fake.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Fetches today's activity summary.
    async fn daily_activity_summary(&self) -> Result<ActivitySummary, ApiError>;
}
