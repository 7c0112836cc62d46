//! Structured telemetry initialisation for the relay daemon.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use relay_config::{Config, LogFormat};

use crate::dispatch::DISPATCH_TARGET;
use crate::sender::SENDER_TARGET;
use crate::service::SERVICE_TARGET;
use crate::transport::LISTENER_TARGET;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Component names accepted in log filter directives.
const COMPONENT_TARGETS: [(&str, &str); 4] = [
    ("listener", LISTENER_TARGET),
    ("dispatch", DISPATCH_TARGET),
    ("sender", SENDER_TARGET),
    ("service", SERVICE_TARGET),
];

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global tracing subscriber on first use.
///
/// The filter accepts the daemon's component names (`listener`, `dispatch`,
/// `sender`, `service`) in place of their targets, so `listener=debug,info`
/// traces every accepted connection while the rest stays at `info`.
///
/// Later calls return a fresh [`TelemetryHandle`] without touching the
/// global state, whatever configuration they are given.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparseable filter and
/// [`TelemetryError::Subscriber`] when another subscriber is already
/// installed.
///
/// # Examples
///
/// ```rust
/// use relay_config::Config;
/// use relayd::telemetry;
///
/// # fn main() -> Result<(), relayd::telemetry::TelemetryError> {
/// let config = Config::default();
/// let first = telemetry::initialise(&config)?;
/// let second = telemetry::initialise(&config)?;
/// drop(first);
/// drop(second);
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(expand_filter(config.log_filter()))
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_names(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

/// Rewrites component names in `filter` to their tracing targets.
fn expand_filter(filter: &str) -> String {
    filter
        .split(',')
        .map(|raw| {
            let directive = raw.trim();
            let (name, level) = directive
                .split_once('=')
                .map_or((directive, None), |(component, value)| (component, Some(value)));
            let resolved = COMPONENT_TARGETS
                .iter()
                .find(|(component, _)| *component == name)
                .map(|(_, target)| *target);
            match (resolved, level) {
                (Some(target), Some(value)) => format!("{target}={value}"),
                (Some(target), None) => target.to_owned(),
                (None, _) => directive.to_owned(),
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
