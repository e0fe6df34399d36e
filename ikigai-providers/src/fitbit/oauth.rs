//! Fitbit OAuth2 credential management.
//!
//! [`TokenSource`] exchanges the authorization code once and then keeps the
//! access token fresh, renewing it with the refresh token before any request
//! that would otherwise go out with an expired token.
//!
//! # Token Response Format
//!
//! ```json
//! {
//!   "access_token": "eyJhbGciOi...",
//!   "expires_in": 28800,
//!   "refresh_token": "c643a63c07...",
//!   "scope": "activity profile",
//!   "token_type": "Bearer",
//!   "user_id": "26FWFL"
//! }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use ikigai_core::AuthError;
use ikigai_fetch::HttpClient;
use reqwest::RequestBuilder;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

// ============================================================================
// Constants
// ============================================================================

/// Fitbit OAuth2 token endpoint.
pub const FITBIT_TOKEN_URL: &str = "https://api.fitbit.com/oauth2/token";

/// How long before expiry a token is already treated as expired.
///
/// Matches the default HTTP timeout, so a token handed out is valid for the
/// whole request.
pub const DEFAULT_EXPIRY_SKEW: Duration = Duration::from_secs(30);

// ============================================================================
// Credentials
// ============================================================================

/// OAuth2 client credentials plus the one-time authorization code.
#[derive(Clone)]
pub struct Credentials {
    /// OAuth2 client ID.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Redirect URL registered for the application.
    pub redirect_url: String,
    /// Authorization code to exchange for the first token pair.
    pub authorization_code: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .field("authorization_code", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Token Pair
// ============================================================================

/// Token response from the Fitbit token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Current access/refresh token pair.
#[derive(Clone)]
struct TokenPair {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenPair {
    /// Builds a pair from a token response.
    ///
    /// `previous_refresh` is kept when the response carries no new refresh
    /// token.
    fn from_response(
        response: TokenResponse,
        previous_refresh: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, AuthError> {
        if response.access_token.is_empty() {
            return Err(AuthError::Malformed("empty access_token".to_string()));
        }

        let expires_at = match response.expires_in {
            Some(secs) => Some(
                TimeDelta::try_seconds(secs)
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        AuthError::Malformed(format!("expires_in out of range: {secs}"))
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at,
        })
    }

    /// Returns true if the token expires within `skew` of `now`.
    ///
    /// A pair without an expiry never counts as expired. A skew reaching
    /// past the representable range counts every token as expired.
    fn is_expired(&self, now: DateTime<Utc>, skew: TimeDelta) -> bool {
        self.expires_at
            .is_some_and(|exp| now.checked_add_signed(skew).is_none_or(|deadline| exp <= deadline))
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// ============================================================================
// Token Source
// ============================================================================

/// Owner of the Fitbit token pair.
///
/// The pair lives behind an async mutex and is only ever handed out as a
/// bearer header on an outgoing request.
pub struct TokenSource {
    http: HttpClient,
    token_url: String,
    client_id: String,
    client_secret: String,
    skew: TimeDelta,
    pair: Mutex<TokenPair>,
    refreshes: AtomicU64,
}

impl TokenSource {
    /// Exchanges the authorization code at the Fitbit token endpoint.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the exchange fails for any reason. There
    /// is no usable token afterwards, so callers should treat this as fatal.
    pub async fn initialize(http: HttpClient, credentials: &Credentials) -> Result<Self, AuthError> {
        Self::initialize_at(http, credentials, FITBIT_TOKEN_URL).await
    }

    /// Exchanges the authorization code at a custom token endpoint.
    ///
    /// # Errors
    ///
    /// See [`TokenSource::initialize`].
    #[instrument(skip(http, credentials), fields(client_id = %credentials.client_id))]
    pub async fn initialize_at(
        http: HttpClient,
        credentials: &Credentials,
        token_url: &str,
    ) -> Result<Self, AuthError> {
        debug!("Exchanging authorization code");

        let params = [
            ("grant_type", "authorization_code"),
            ("code", credentials.authorization_code.as_str()),
            ("redirect_uri", credentials.redirect_url.as_str()),
            ("client_id", credentials.client_id.as_str()),
        ];

        let response = request_token(
            &http,
            token_url,
            &credentials.client_id,
            &credentials.client_secret,
            &params,
        )
        .await?;

        info!(
            user_id = response.user_id.as_deref().unwrap_or("-"),
            scope = response.scope.as_deref().unwrap_or("-"),
            "Authorization code exchanged"
        );

        let pair = TokenPair::from_response(response, None, Utc::now())?;

        Ok(Self {
            http,
            token_url: token_url.to_string(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            skew: to_time_delta(DEFAULT_EXPIRY_SKEW),
            pair: Mutex::new(pair),
            refreshes: AtomicU64::new(0),
        })
    }

    /// Sets how long before expiry a token is renewed.
    #[must_use]
    pub fn with_expiry_skew(mut self, skew: Duration) -> Self {
        self.skew = to_time_delta(skew);
        self
    }

    /// Returns how many refresh exchanges have succeeded.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    /// Attaches a valid bearer token to `request`, refreshing first if the
    /// stored token is expired or about to expire.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoRefreshToken`] if the token expired and cannot
    /// be renewed, or the refresh exchange's error. The stored pair is left
    /// untouched on failure.
    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, AuthError> {
        let mut pair = self.pair.lock().await;

        if pair.is_expired(Utc::now(), self.skew) {
            let renewed = self.refresh(&pair).await?;
            *pair = renewed;
            self.refreshes.fetch_add(1, Ordering::Relaxed);
        }

        Ok(request.bearer_auth(&pair.access_token))
    }

    #[instrument(skip_all, fields(expired_at = ?pair.expires_at))]
    async fn refresh(&self, pair: &TokenPair) -> Result<TokenPair, AuthError> {
        let refresh_token = pair
            .refresh_token
            .clone()
            .ok_or(AuthError::NoRefreshToken)?;

        debug!("Refreshing access token");

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];

        let response = request_token(
            &self.http,
            &self.token_url,
            &self.client_id,
            &self.client_secret,
            &params,
        )
        .await?;

        let renewed = TokenPair::from_response(response, Some(refresh_token), Utc::now())?;
        info!(expires_at = ?renewed.expires_at, "Access token refreshed");
        Ok(renewed)
    }
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSource")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("skew", &self.skew)
            .field("refreshes", &self.refresh_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Posts a token grant with HTTP Basic client authentication.
async fn request_token(
    http: &HttpClient,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let request = http
        .post(token_url)
        .basic_auth(client_id, Some(client_secret))
        .form(params);

    let response = http
        .send(request)
        .await
        .map_err(|e| AuthError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AuthError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(AuthError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| AuthError::Malformed(e.to_string()))
}

/// Converts a std duration, saturating at [`TimeDelta::MAX`].
fn to_time_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> TokenResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_from_response_full() {
        let now = Utc::now();
        let pair = TokenPair::from_response(
            response(r#"{"access_token":"a","refresh_token":"r","expires_in":3600,"token_type":"Bearer"}"#),
            None,
            now,
        )
        .unwrap();

        assert_eq!(pair.access_token, "a");
        assert_eq!(pair.refresh_token.as_deref(), Some("r"));
        assert_eq!(pair.expires_at, Some(now + TimeDelta::seconds(3600)));
    }

    #[test]
    fn test_from_response_keeps_previous_refresh_token() {
        let pair = TokenPair::from_response(
            response(r#"{"access_token":"a2","expires_in":60}"#),
            Some("r1".to_string()),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(pair.refresh_token.as_deref(), Some("r1"));
    }

    #[test]
    fn test_from_response_rejects_empty_token() {
        let err = TokenPair::from_response(response(r#"{"access_token":""}"#), None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[test]
    fn test_from_response_rejects_absurd_lifetime() {
        let err = TokenPair::from_response(
            response(r#"{"access_token":"a","expires_in":9223372036854775807}"#),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let skew = TimeDelta::seconds(30);
        let pair = |expires_at| TokenPair {
            access_token: "a".to_string(),
            refresh_token: None,
            expires_at,
        };

        assert!(pair(Some(now - TimeDelta::hours(1))).is_expired(now, skew));
        assert!(pair(Some(now + TimeDelta::seconds(10))).is_expired(now, skew));
        assert!(!pair(Some(now + TimeDelta::hours(1))).is_expired(now, skew));
        assert!(!pair(None).is_expired(now, skew));
    }

    #[test]
    fn test_is_expired_with_out_of_range_skew() {
        let now = Utc::now();
        let pair = TokenPair {
            access_token: "a".to_string(),
            refresh_token: None,
            expires_at: Some(now + TimeDelta::hours(8)),
        };

        assert!(pair.is_expired(now, TimeDelta::MAX));
        assert!(pair.is_expired(now, to_time_delta(Duration::from_secs(3_000_000_000 * 3600))));
    }

    #[test]
    fn test_to_time_delta_saturates() {
        assert_eq!(to_time_delta(Duration::from_secs(30)), TimeDelta::seconds(30));
        assert_eq!(to_time_delta(Duration::MAX), TimeDelta::MAX);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = Credentials {
            client_id: "id".to_string(),
            client_secret: "super-secret".to_string(),
            redirect_url: "http://localhost/callback".to_string(),
            authorization_code: "one-time-code".to_string(),
        };

        let debug = format!("{credentials:?}");
        assert!(debug.contains("id"));
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("one-time-code"));
    }
}
