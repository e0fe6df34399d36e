// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Ikigai - publishes Fitbit daily activity to a Prometheus Pushgateway.
//!
//! # Examples
//!
//! ```bash
//! # Configure through the environment and poll every minute
//! export IKIGAI_FITBIT_OAUTH2_CLIENT_ID=...
//! export IKIGAI_FITBIT_OAUTH2_CLIENT_SECRET=...
//! export IKIGAI_FITBIT_OAUTH2_AUTHORIZATION_CODE=...
//! export IKIGAI_FITBIT_OAUTH2_REDIRECT_URL=http://localhost:8080/callback
//! export IKIGAI_PROMETHEUS_PUSHGATEWAY_HOST=localhost
//! ikigai
//!
//! # Poll every five minutes with debug logging
//! ikigai --interval 5m --debug
//!
//! # Push once and exit
//! ikigai --once
//! ```

mod config;

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::Parser;
use ikigai_fetch::{HttpClient, PollScheduler, PushGateway, TickError};
use ikigai_providers::fitbit::{FitbitApiClient, TokenSource, DEFAULT_EXPIRY_SKEW};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::{ConfigError, Settings, ENV_USAGE};

// ============================================================================
// CLI Definition
// ============================================================================

/// Ikigai - Fitbit activity to Prometheus Pushgateway.
///
/// Every option can also be set through the environment variable shown
/// next to it.
#[derive(Parser, Debug)]
#[command(name = "ikigai")]
#[command(about = "Publishes Fitbit daily activity to a Prometheus Pushgateway")]
#[command(after_help = ENV_USAGE)]
#[command(version)]
pub struct Cli {
    /// Client ID of your Fitbit app.
    #[arg(long, env = config::ENV_CLIENT_ID)]
    pub client_id: Option<String>,

    /// Client secret of your Fitbit app.
    #[arg(long, env = config::ENV_CLIENT_SECRET, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Authorization code to exchange for an access and refresh token.
    #[arg(long, env = config::ENV_AUTHORIZATION_CODE, hide_env_values = true)]
    pub authorization_code: Option<String>,

    /// Redirect URL registered for your Fitbit app.
    #[arg(long, env = config::ENV_REDIRECT_URL)]
    pub redirect_url: Option<String>,

    /// Host the Prometheus Pushgateway runs on.
    #[arg(long, env = config::ENV_GATEWAY_HOST)]
    pub gateway_host: Option<String>,

    /// Port the Prometheus Pushgateway runs on [default: 9091].
    #[arg(long, env = config::ENV_GATEWAY_PORT)]
    pub gateway_port: Option<String>,

    /// Job name metrics are pushed under [default: fitbit_api].
    #[arg(long, env = config::ENV_GATEWAY_JOB)]
    pub job: Option<String>,

    /// Poll interval, e.g. 60s, 5m, 1h [default: 60s].
    #[arg(long, env = config::ENV_INTERVAL)]
    pub interval: Option<String>,

    /// Timeout for every HTTP request [default: 30s].
    #[arg(long, env = config::ENV_TIMEOUT)]
    pub timeout: Option<String>,

    /// Date segment of the activity URL: 'local' or 'today' [default: local].
    #[arg(long, env = config::ENV_DATE_MODE)]
    pub date_mode: Option<String>,

    /// Prefix for metric names; empty for none.
    #[arg(long, env = config::ENV_NAMESPACE, default_value = "fitbit")]
    pub namespace: String,

    /// Enable debug logging.
    #[arg(long, env = config::ENV_DEBUG, value_parser = FalseyValueParser::new())]
    pub debug: bool,

    /// Run a single poll, then exit.
    #[arg(long)]
    pub once: bool,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// Runtime error, or a failed tick with `--once`.
    Error = 1,
    /// Missing or invalid configuration.
    Config = 2,
    /// The authorization code could not be exchanged.
    Auth = 3,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(debug: bool) {
    let default_filter = if debug { "ikigai=debug,info" } else { "ikigai=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => exit_with_config_error(&e),
    };

    setup_logging(settings.debug);

    let code = run(settings).await?;
    if !matches!(code, ExitCode::Success) {
        std::process::exit(code as i32);
    }

    Ok(())
}

fn exit_with_config_error(err: &ConfigError) -> ! {
    eprintln!("Error: {err}");
    eprintln!();
    eprintln!("{ENV_USAGE}");
    std::process::exit(ExitCode::Config as i32);
}

/// Exchanges the authorization code, then polls until interrupted.
async fn run(settings: Settings) -> Result<ExitCode> {
    let http = HttpClient::with_timeout(settings.timeout).context("failed to build HTTP client")?;

    let tokens = match TokenSource::initialize(http.clone(), &settings.credentials).await {
        Ok(tokens) => tokens.with_expiry_skew(settings.timeout.max(DEFAULT_EXPIRY_SKEW)),
        Err(e) => {
            error!(error = %e, "Authorization code exchange failed");
            eprintln!("Error: authorization failed: {e}");
            return Ok(ExitCode::Auth);
        }
    };

    let client = FitbitApiClient::new(http.clone(), tokens).with_date(settings.date);
    let gateway = PushGateway::new(http, settings.gateway_url.as_str(), &settings.job)
        .context("invalid Pushgateway configuration")?;

    info!(
        gateway = %gateway.push_url(),
        interval = ?settings.interval,
        namespace = %settings.namespace,
        date = %settings.date,
        "Pushing activity metrics"
    );

    let mut scheduler = PollScheduler::new(client, gateway).with_namespace(settings.namespace);

    if settings.once {
        return Ok(match scheduler.run_tick().await {
            Ok(report) => {
                info!(metrics = report.metrics_pushed, "Pushed activity metrics");
                ExitCode::Success
            }
            Err(TickError::Api(e)) => {
                error!(kind = %e.kind(), status = e.status(), error = %e, "Activity fetch failed");
                ExitCode::Error
            }
            Err(TickError::Push(e)) => {
                error!(error = %e, "Metrics push failed");
                ExitCode::Error
            }
        });
    }

    tokio::select! {
        () = scheduler.run(settings.interval) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            info!("Interrupted, shutting down");
        }
    }

    Ok(ExitCode::Success)
}
