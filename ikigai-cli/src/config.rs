//! Startup configuration.
//!
//! Raw values come from [`Cli`](crate::Cli) (flags or environment
//! variables) and are validated into [`Settings`]. Every missing required
//! value is reported at once.

use std::time::Duration;

use ikigai_fetch::DEFAULT_JOB;
use ikigai_providers::fitbit::{ActivityDate, Credentials};
use thiserror::Error;
use url::Url;

use crate::Cli;

// ============================================================================
// Constants
// ============================================================================

pub const ENV_CLIENT_ID: &str = "IKIGAI_FITBIT_OAUTH2_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "IKIGAI_FITBIT_OAUTH2_CLIENT_SECRET";
pub const ENV_AUTHORIZATION_CODE: &str = "IKIGAI_FITBIT_OAUTH2_AUTHORIZATION_CODE";
pub const ENV_REDIRECT_URL: &str = "IKIGAI_FITBIT_OAUTH2_REDIRECT_URL";
pub const ENV_GATEWAY_HOST: &str = "IKIGAI_PROMETHEUS_PUSHGATEWAY_HOST";
pub const ENV_GATEWAY_PORT: &str = "IKIGAI_PROMETHEUS_PUSHGATEWAY_PORT";
pub const ENV_GATEWAY_JOB: &str = "IKIGAI_PROMETHEUS_PUSHGATEWAY_JOB";
pub const ENV_INTERVAL: &str = "IKIGAI_INTERVAL_DURATION";
pub const ENV_TIMEOUT: &str = "IKIGAI_HTTP_TIMEOUT";
pub const ENV_DATE_MODE: &str = "IKIGAI_FITBIT_DATE_MODE";
pub const ENV_NAMESPACE: &str = "IKIGAI_METRICS_NAMESPACE";
pub const ENV_DEBUG: &str = "IKIGAI_DEBUG";

const DEFAULT_GATEWAY_PORT: u16 = 9091;
const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable listing printed on configuration errors.
pub const ENV_USAGE: &str = "\
Environment variables:
  IKIGAI_FITBIT_OAUTH2_CLIENT_ID           Client ID of your Fitbit app (required)
  IKIGAI_FITBIT_OAUTH2_CLIENT_SECRET       Client secret of your Fitbit app (required)
  IKIGAI_FITBIT_OAUTH2_AUTHORIZATION_CODE  Code to exchange for an access and refresh token (required)
  IKIGAI_FITBIT_OAUTH2_REDIRECT_URL        URL Fitbit sent the authorization code to (required)
  IKIGAI_PROMETHEUS_PUSHGATEWAY_HOST       Host the Prometheus Pushgateway runs on (required)
  IKIGAI_PROMETHEUS_PUSHGATEWAY_PORT       Port the Prometheus Pushgateway runs on [default: 9091]
  IKIGAI_PROMETHEUS_PUSHGATEWAY_JOB        Job name metrics are pushed under [default: fitbit_api]
  IKIGAI_INTERVAL_DURATION                 How often to pull metrics from Fitbit (60s, 5m, 1h...) [default: 60s]
  IKIGAI_HTTP_TIMEOUT                      Timeout for every HTTP request [default: 30s]
  IKIGAI_FITBIT_DATE_MODE                  'local' (local calendar date) or 'today' [default: local]
  IKIGAI_METRICS_NAMESPACE                 Prefix for metric names, empty for none [default: fitbit]
  IKIGAI_DEBUG                             Enable debug logging [default: false]";

// ============================================================================
// Errors
// ============================================================================

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more required values are missing or empty.
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// A value is present but cannot be used.
    #[error("invalid {name}: {reason}")]
    Invalid {
        /// Environment variable name.
        name: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
}

// ============================================================================
// Settings
// ============================================================================

/// Validated startup settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub gateway_url: Url,
    pub job: String,
    pub namespace: String,
    pub interval: Duration,
    pub timeout: Duration,
    pub date: ActivityDate,
    pub debug: bool,
    pub once: bool,
}

impl Settings {
    /// Validates raw command line values.
    ///
    /// Missing required values are collected first and reported together;
    /// only when all of them are present are the remaining values parsed.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut required = |value: Option<&str>, name: &'static str| {
            let value = present(value);
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default().to_string()
        };

        let client_id = required(cli.client_id.as_deref(), ENV_CLIENT_ID);
        let client_secret = required(cli.client_secret.as_deref(), ENV_CLIENT_SECRET);
        let authorization_code = required(cli.authorization_code.as_deref(), ENV_AUTHORIZATION_CODE);
        let redirect_url = required(cli.redirect_url.as_deref(), ENV_REDIRECT_URL);
        let gateway_host = required(cli.gateway_host.as_deref(), ENV_GATEWAY_HOST);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let gateway_port = match present(cli.gateway_port.as_deref()) {
            Some(raw) => parse_port(raw).map_err(|reason| ConfigError::Invalid {
                name: ENV_GATEWAY_PORT,
                reason,
            })?,
            None => DEFAULT_GATEWAY_PORT,
        };

        let interval = optional_duration(cli.interval.as_deref(), ENV_INTERVAL, DEFAULT_INTERVAL)?;
        let timeout = optional_duration(cli.timeout.as_deref(), ENV_TIMEOUT, DEFAULT_TIMEOUT)?;

        let date = match present(cli.date_mode.as_deref()) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                name: ENV_DATE_MODE,
                reason,
            })?,
            None => ActivityDate::default(),
        };

        let namespace = cli.namespace.trim().to_string();
        validate_namespace(&namespace).map_err(|reason| ConfigError::Invalid {
            name: ENV_NAMESPACE,
            reason,
        })?;

        let job = present(cli.job.as_deref()).unwrap_or(DEFAULT_JOB).to_string();

        let gateway_url =
            gateway_url(&gateway_host, gateway_port).map_err(|reason| ConfigError::Invalid {
                name: ENV_GATEWAY_HOST,
                reason,
            })?;

        Ok(Self {
            credentials: Credentials {
                client_id,
                client_secret,
                redirect_url,
                authorization_code,
            },
            gateway_url,
            job,
            namespace,
            interval,
            timeout,
            date,
            debug: cli.debug,
            once: cli.once,
        })
    }
}

// ============================================================================
// Value Parsing
// ============================================================================

/// Returns the trimmed value, or `None` if it is absent or blank.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn optional_duration(
    value: Option<&str>,
    name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match present(value) {
        Some(raw) => parse_duration(raw).map_err(|reason| ConfigError::Invalid { name, reason }),
        None => Ok(default),
    }
}

fn parse_port(raw: &str) -> Result<u16, String> {
    match raw.parse::<u16>() {
        Ok(0) => Err("port must be between 1 and 65535".to_string()),
        Ok(port) => Ok(port),
        Err(e) => Err(format!("'{raw}' is not a port number: {e}")),
    }
}

fn gateway_url(host: &str, port: u16) -> Result<Url, String> {
    if host.contains("://") {
        return Err(format!("'{host}' must be a host name without a scheme"));
    }

    let url = Url::parse(&format!("http://{host}:{port}")).map_err(|e| format!("'{host}': {e}"))?;
    if url.path() != "/" || url.port_or_known_default() != Some(port) {
        return Err(format!("'{host}' must be a bare host name"));
    }

    Ok(url)
}

fn validate_namespace(namespace: &str) -> Result<(), String> {
    let valid = namespace
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_alphabetic() || c == '_' || c == ':' || (i > 0 && c.is_ascii_digit()));

    if valid {
        Ok(())
    } else {
        Err(format!("'{namespace}' is not a valid metric name prefix"))
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parses a duration such as `500ms`, `60s`, `5m`, `1h30m` or `1.5h`.
///
/// A bare number is taken as seconds. Zero is rejected.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_string());
    }

    let total_nanos = if let Ok(secs) = input.parse::<u64>() {
        u128::from(secs) * NANOS_PER_SEC
    } else {
        let mut total: u128 = 0;
        let mut rest = input;

        while !rest.is_empty() {
            let split = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            let (number, tail) = rest.split_at(split);

            let split = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(split);

            let unit_nanos: u128 = match unit {
                "ns" => 1,
                "us" | "µs" => 1_000,
                "ms" => 1_000_000,
                "s" => NANOS_PER_SEC,
                "m" => 60 * NANOS_PER_SEC,
                "h" => 3_600 * NANOS_PER_SEC,
                "" => return Err(format!("missing unit in '{input}'")),
                other => return Err(format!("unknown unit '{other}' in '{input}'")),
            };

            let nanos = scaled_nanos(number, unit_nanos)
                .ok_or_else(|| format!("invalid number '{number}' in '{input}'"))?;
            total = total
                .checked_add(nanos)
                .ok_or_else(|| format!("'{input}' is too large"))?;
            rest = tail;
        }

        total
    };

    if total_nanos == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    let secs = u64::try_from(total_nanos / NANOS_PER_SEC)
        .map_err(|_| format!("'{input}' is too large"))?;
    let nanos = u32::try_from(total_nanos % NANOS_PER_SEC)
        .map_err(|_| format!("'{input}' is too large"))?;
    Ok(Duration::new(secs, nanos))
}

/// Converts `number` units of `unit_nanos` each into nanoseconds.
fn scaled_nanos(number: &str, unit_nanos: u128) -> Option<u128> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(unit_nanos)?;

    if !fraction.is_empty() {
        // Anything below a nanosecond is dropped.
        let digits = &fraction[..fraction.len().min(18)];
        let value: u128 = digits.parse().ok()?;
        let scale = 10u128.checked_pow(u32::try_from(digits.len()).ok()?)?;
        nanos = nanos.checked_add(value * unit_nanos / scale)?;
    }

    Some(nanos)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::sync::{Mutex, PoisonError};

    const REQUIRED: [&str; 10] = [
        "--client-id",
        "client",
        "--client-secret",
        "secret",
        "--authorization-code",
        "code",
        "--redirect-url",
        "http://localhost:8080/callback",
        "--gateway-host",
        "pushgateway",
    ];

    /// Serializes parsing with tests that set environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn cli(extra: &[&str]) -> Cli {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let args = std::iter::once("ikigai")
            .chain(REQUIRED)
            .chain(extra.iter().copied());
        Cli::try_parse_from(args).unwrap()
    }

    fn cli_with_env(name: &str, value: &str) -> Result<Cli, clap::Error> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        // SAFETY: every test that reads the environment holds ENV_LOCK.
        unsafe { std::env::set_var(name, value) };
        let result = Cli::try_parse_from(std::iter::once("ikigai").chain(REQUIRED));
        // SAFETY: as above.
        unsafe { std::env::remove_var(name) };
        result
    }

    fn empty_cli() -> Cli {
        Cli {
            client_id: None,
            client_secret: None,
            authorization_code: None,
            redirect_url: None,
            gateway_host: None,
            gateway_port: None,
            job: None,
            interval: None,
            timeout: None,
            date_mode: None,
            namespace: "fitbit".to_string(),
            debug: false,
            once: false,
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_cli(&cli(&[])).unwrap();

        assert_eq!(settings.credentials.client_id, "client");
        assert_eq!(settings.credentials.authorization_code, "code");
        assert_eq!(settings.gateway_url.as_str(), "http://pushgateway:9091/");
        assert_eq!(settings.job, "fitbit_api");
        assert_eq!(settings.namespace, "fitbit");
        assert_eq!(settings.interval, Duration::from_secs(60));
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.date, ActivityDate::Local);
        assert!(!settings.debug);
        assert!(!settings.once);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_cli(&cli(&[
            "--gateway-port",
            "9999",
            "--interval",
            "5m",
            "--timeout",
            "10s",
            "--date-mode",
            "today",
            "--namespace",
            "",
            "--job",
            "activity",
            "--debug",
            "--once",
        ]))
        .unwrap();

        assert_eq!(settings.gateway_url.as_str(), "http://pushgateway:9999/");
        assert_eq!(settings.interval, Duration::from_secs(300));
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.date, ActivityDate::Today);
        assert_eq!(settings.namespace, "");
        assert_eq!(settings.job, "activity");
        assert!(settings.debug);
        assert!(settings.once);
    }

    #[test]
    fn test_debug_from_env() {
        for (value, expected) in [
            ("1", true),
            ("true", true),
            ("yes", true),
            ("0", false),
            ("false", false),
            ("", false),
        ] {
            let raw = cli_with_env(ENV_DEBUG, value)
                .unwrap_or_else(|e| panic!("{ENV_DEBUG}={value:?} rejected: {e}"));
            let settings = Settings::from_cli(&raw).unwrap();
            assert_eq!(settings.debug, expected, "{ENV_DEBUG}={value:?}");
        }
    }

    #[test]
    fn test_debug_flag() {
        assert!(Settings::from_cli(&cli(&["--debug"])).unwrap().debug);
    }

    #[test]
    fn test_all_missing_values_reported_together() {
        let err = Settings::from_cli(&empty_cli()).unwrap_err();

        assert_eq!(
            err,
            ConfigError::Missing(vec![
                ENV_CLIENT_ID,
                ENV_CLIENT_SECRET,
                ENV_AUTHORIZATION_CODE,
                ENV_REDIRECT_URL,
                ENV_GATEWAY_HOST,
            ])
        );
        assert!(err.to_string().contains(ENV_GATEWAY_HOST));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let mut raw = cli(&[]);
        raw.client_secret = Some("   ".to_string());
        raw.gateway_host = Some(String::new());

        let err = Settings::from_cli(&raw).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing(vec![ENV_CLIENT_SECRET, ENV_GATEWAY_HOST])
        );
    }

    #[test]
    fn test_blank_optional_values_use_defaults() {
        let mut raw = cli(&[]);
        raw.gateway_port = Some(String::new());
        raw.interval = Some(" ".to_string());
        raw.job = Some(String::new());

        let settings = Settings::from_cli(&raw).unwrap();
        assert_eq!(settings.gateway_url.port(), Some(9091));
        assert_eq!(settings.interval, Duration::from_secs(60));
        assert_eq!(settings.job, "fitbit_api");
    }

    #[test]
    fn test_invalid_port() {
        for port in ["abc", "0", "70000"] {
            let err = Settings::from_cli(&cli(&["--gateway-port", port])).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: ENV_GATEWAY_PORT, .. }),
                "port {port}: {err:?}"
            );
        }
    }

    #[test]
    fn test_invalid_interval() {
        let err = Settings::from_cli(&cli(&["--interval", "0s"])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_INTERVAL, .. }));
    }

    #[test]
    fn test_invalid_date_mode() {
        let err = Settings::from_cli(&cli(&["--date-mode", "yesterday"])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_DATE_MODE, .. }));
    }

    #[test]
    fn test_invalid_namespace() {
        let err = Settings::from_cli(&cli(&["--namespace", "1fitbit"])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_NAMESPACE, .. }));

        let err = Settings::from_cli(&cli(&["--namespace", "fit-bit"])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_NAMESPACE, .. }));
    }

    #[test]
    fn test_gateway_host_with_scheme_rejected() {
        let mut raw = cli(&[]);
        raw.gateway_host = Some("http://pushgateway".to_string());

        let err = Settings::from_cli(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_GATEWAY_HOST, .. }));
    }

    #[test]
    fn test_gateway_host_with_port_rejected() {
        let mut raw = cli(&[]);
        raw.gateway_host = Some("pushgateway:9091".to_string());

        assert!(Settings::from_cli(&raw).is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("60s"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_duration("5m"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration("1.5h"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("2m0.5s"), Ok(Duration::from_millis(120_500)));
        assert_eq!(parse_duration("90"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_duration("250us"), Ok(Duration::from_micros(250)));
    }

    #[test]
    fn test_parse_duration_rejects() {
        for input in ["", "0", "0s", "s", "10x", "abc", "1..5s", "-5s", ".s"] {
            assert!(parse_duration(input).is_err(), "{input:?} should be rejected");
        }
    }
}
