//! Hosting the listener as a long-running service.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use relay_config::Config;

use crate::dispatch::{DataEvent, DispatchConnectionHandler, EventBus, TimeSyncMonitor};
use crate::telemetry::{self, TelemetryError};
use crate::transport::{ListenerError, ListenerHandle, ReadPolicy, RelayListener};

pub(crate) const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the service configuration.
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until shutdown should proceed.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the notification source cannot be
    /// set up.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Shutdown listener that waits for a termination signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        if let Some(signal) = signals.forever().next() {
            info!(target: SERVICE_TARGET, signal, "shutdown signal received");
        }
        Ok(())
    }
}

/// Errors surfaced while running the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The listener could not be started or did not stop cleanly.
    #[error("listener failure: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// Waiting for shutdown failed.
    #[error("failed to wait for shutdown: {source}")]
    Shutdown {
        /// Underlying signal error.
        #[source]
        source: ShutdownError,
    },
}

/// A started listener together with the address it is bound to.
#[derive(Debug)]
pub struct RunningListener {
    /// Handle controlling the accept loop.
    pub handle: ListenerHandle,
    /// Bound address, when the platform reports it.
    pub local_addr: Option<SocketAddr>,
}

/// Binds the configured endpoint and starts dispatching into `bus`.
///
/// # Errors
///
/// Returns [`ListenerError`] when binding or starting the listener fails.
pub fn start_listener(config: &Config, bus: Arc<EventBus>) -> Result<RunningListener, ListenerError> {
    let listener = RelayListener::bind(config.listen_endpoint())?;
    let local_addr = listener.local_addr();
    let handler = Arc::new(DispatchConnectionHandler::new(
        bus,
        ReadPolicy::from_config(config),
    ));
    let handle = listener.start(handler)?;
    Ok(RunningListener { handle, local_addr })
}

/// Builds the bus used by the daemon: a logging data subscriber and a
/// [`TimeSyncMonitor`], which is returned for inspection.
#[must_use]
pub fn service_bus() -> (Arc<EventBus>, Arc<TimeSyncMonitor>) {
    let bus = Arc::new(EventBus::new());
    bus.subscribe_data(log_data_event);
    let monitor = Arc::new(TimeSyncMonitor::new());
    bus.subscribe_time_shared(monitor.clone());
    (bus, monitor)
}

fn log_data_event(event: &DataEvent) {
    let command = event.command();
    info!(
        target: SERVICE_TARGET,
        kind = %command.kind(),
        primary = command.primary_token(),
        arguments = ?command.arguments(),
        response = command.is_response(),
        "controller data received"
    );
}

/// Runs the service until `signal` fires.
///
/// # Errors
///
/// Returns [`ServiceError`] when any startup stage fails, when the shutdown
/// signal cannot be awaited, or when the listener thread panicked.
pub fn run_service(
    loader: &dyn ConfigLoader,
    signal: &dyn ShutdownSignal,
) -> Result<(), ServiceError> {
    let config = loader
        .load()
        .map_err(|source| ServiceError::Configuration { source })?;
    telemetry::initialise(&config).map_err(|source| ServiceError::Telemetry { source })?;

    let (bus, _monitor) = service_bus();
    let running =
        start_listener(&config, bus).map_err(|source| ServiceError::Listener { source })?;
    info!(
        target: SERVICE_TARGET,
        endpoint = %config.listen_endpoint(),
        local_addr = ?running.local_addr,
        controller = %config.controller_endpoint(),
        "relay service started"
    );

    let waited = signal.wait();
    running.handle.shutdown();
    running
        .handle
        .join()
        .map_err(|source| ServiceError::Listener { source })?;
    waited.map_err(|source| ServiceError::Shutdown { source })?;
    info!(target: SERVICE_TARGET, "relay service stopped");
    Ok(())
}
