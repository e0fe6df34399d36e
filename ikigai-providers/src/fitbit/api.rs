//! Fitbit Web API client.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Local;
use ikigai_core::{ActivitySource, ActivitySummary, ApiError};
use ikigai_fetch::HttpClient;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use super::oauth::TokenSource;
use super::parser::parse_daily_activity;

// ============================================================================
// Constants
// ============================================================================

/// Fitbit Web API base URL.
pub const FITBIT_API_BASE: &str = "https://api.fitbit.com";

// ============================================================================
// Activity Date
// ============================================================================

/// How the "today" path segment of the activity URL is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivityDate {
    /// The literal `today` segment, resolved by Fitbit in the user's time zone.
    Today,
    /// Today's date in the local time zone, formatted `YYYY-MM-DD`.
    #[default]
    Local,
}

impl ActivityDate {
    /// Returns the path segment for the current day.
    pub fn path_segment(self) -> String {
        match self {
            Self::Today => "today".to_string(),
            Self::Local => Local::now().format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for ActivityDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("today"),
            Self::Local => f.write_str("local"),
        }
    }
}

impl FromStr for ActivityDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "local" => Ok(Self::Local),
            other => Err(format!("expected 'today' or 'local', got '{other}'")),
        }
    }
}

// ============================================================================
// API Client
// ============================================================================

/// Fitbit API client.
#[derive(Debug)]
pub struct FitbitApiClient {
    http: HttpClient,
    tokens: TokenSource,
    base_url: String,
    date: ActivityDate,
}

impl FitbitApiClient {
    /// Creates a client for the public Fitbit API.
    pub fn new(http: HttpClient, tokens: TokenSource) -> Self {
        Self {
            http,
            tokens,
            base_url: FITBIT_API_BASE.to_string(),
            date: ActivityDate::default(),
        }
    }

    /// Points the client at a different API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Selects how the date path segment is produced.
    #[must_use]
    pub fn with_date(mut self, date: ActivityDate) -> Self {
        self.date = date;
        self
    }

    /// Returns the token source.
    pub fn tokens(&self) -> &TokenSource {
        &self.tokens
    }

    /// Returns the activity summary URL for the current day.
    pub fn activity_url(&self) -> String {
        format!(
            "{}/1/user/-/activities/date/{}.json",
            self.base_url,
            self.date.path_segment()
        )
    }
}

#[async_trait]
impl ActivitySource for FitbitApiClient {
    #[instrument(skip(self), fields(date = %self.date))]
    async fn daily_activity_summary(&self) -> Result<ActivitySummary, ApiError> {
        let url = self.activity_url();
        debug!(url = %url, "Fetching daily activity summary");

        let request = self.tokens.authorize(self.http.get(&url)).await?;

        let response = self
            .http
            .send(request)
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        parse_daily_activity(&body)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_segment() {
        assert_eq!(ActivityDate::Today.path_segment(), "today");
    }

    #[test]
    fn test_local_segment_format() {
        let segment = ActivityDate::Local.path_segment();
        assert_eq!(segment.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&segment, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_parse_activity_date() {
        assert_eq!("today".parse::<ActivityDate>(), Ok(ActivityDate::Today));
        assert_eq!(" Local ".parse::<ActivityDate>(), Ok(ActivityDate::Local));
        assert!("yesterday".parse::<ActivityDate>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for date in [ActivityDate::Today, ActivityDate::Local] {
            assert_eq!(date.to_string().parse::<ActivityDate>(), Ok(date));
        }
    }
}
