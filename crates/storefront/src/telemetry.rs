//! Logging and error tracking setup.
//!
//! Sentry must be initialized before the tracing subscriber so the Sentry
//! layer has a client to report to. Keep the returned [`TelemetryGuard`]
//! alive for the lifetime of the process; dropping it flushes pending events.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, TelemetryConfig};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "shopfront=info,shopfront_cli=info";

/// Keeps the Sentry client alive.
#[must_use = "dropping the guard shuts down error reporting"]
pub struct TelemetryGuard {
    sentry: Option<sentry::ClientInitGuard>,
}

impl TelemetryGuard {
    /// Whether Sentry reporting is active.
    #[must_use]
    pub const fn sentry_enabled(&self) -> bool {
        self.sentry.is_some()
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &TelemetryConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    Some(sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            traces_sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    )))
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global tracing subscriber and, when a DSN is configured, Sentry.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard, TryInitError> {
    let sentry = init_sentry(config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let json = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_target(false)))
        .with(
            sentry
                .is_some()
                .then(|| sentry_tracing::layer().event_filter(sentry_event_filter)),
        )
        .try_init()?;

    if sentry.is_some() {
        tracing::info!("Sentry initialized");
    }

    Ok(TelemetryGuard { sentry })
}
