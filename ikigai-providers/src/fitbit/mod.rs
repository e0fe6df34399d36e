//! Fitbit provider implementation.
//!
//! Fitbit uses OAuth2 authorization-code grants. The one-time authorization
//! code is exchanged at startup; after that the access token is renewed
//! with the refresh token whenever it is about to expire.
//!
//! Endpoints:
//! - Token: `POST https://api.fitbit.com/oauth2/token`
//! - Activity: `GET https://api.fitbit.com/1/user/-/activities/date/<date>.json`

mod api;
mod oauth;
pub(crate) mod parser;

pub use api::{ActivityDate, FitbitApiClient, FITBIT_API_BASE};
pub use oauth::{Credentials, TokenSource, DEFAULT_EXPIRY_SKEW, FITBIT_TOKEN_URL};
pub use parser::parse_daily_activity;
