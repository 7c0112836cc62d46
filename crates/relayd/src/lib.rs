//! Relay daemon: listens for controller notifications and sends commands.
//!
//! The daemon binds the configured notification endpoint and accepts
//! connections on one background thread, serving them strictly one at a
//! time. Each connection carries a single `:`-delimited command which is
//! decoded with [`relay_protocol`] and published on an [`EventBus`]:
//! time-sync commands on the time channel, everything else on the data
//! channel.
//!
//! Outbound commands take a separate path. A [`RelayLink`] hands encoded
//! requests to a [`TransmissionSink`]; the production sink,
//! [`TransmissionSender`], opens a short-lived connection to the controller,
//! writes the request, and closes without reading a reply.

mod dispatch;
mod sender;
mod service;
pub mod telemetry;
mod transport;

pub use dispatch::{
    Channel, DataEvent, DataSubscriber, DispatchConnectionHandler, EventBus, RelayLink,
    TimeEvent, TimeOutcome, TimeSubscriber, TimeSyncMonitor,
};
pub use sender::{SendError, TransmissionSender, TransmissionSink};
pub use service::{
    ConfigLoader, RunningListener, ServiceError, ShutdownError, ShutdownSignal,
    StaticConfigLoader, SystemConfigLoader, SystemShutdownSignal, run_service, service_bus,
    start_listener,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ConnectionHandler, ListenerError, ListenerHandle, ReadPolicy, RelayListener};

#[cfg(test)]
mod tests;
