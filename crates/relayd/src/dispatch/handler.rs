//! Connection handler that publishes inbound commands.

use std::net::TcpStream;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::transport::{ConnectionHandler, ReadPolicy, read_message};

use super::DISPATCH_TARGET;
use super::bus::EventBus;

/// Reads one message per connection and publishes it on the bus.
///
/// The connection is closed when the handler returns, whatever the read
/// outcome. Nothing is written back to the peer. A connection closed without
/// data still publishes an empty, unknown command on the data channel.
#[derive(Debug)]
pub struct DispatchConnectionHandler {
    bus: Arc<EventBus>,
    policy: ReadPolicy,
}

impl DispatchConnectionHandler {
    /// Creates a handler publishing to `bus` under `policy`.
    #[must_use]
    pub const fn new(bus: Arc<EventBus>, policy: ReadPolicy) -> Self {
        Self { bus, policy }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, mut stream: TcpStream) {
        if let Err(error) = stream.set_read_timeout(Some(self.policy.idle())) {
            warn!(target: DISPATCH_TARGET, %error, "failed to arm read timeout");
            return;
        }

        let bytes = match read_message(&mut stream, self.policy.max_bytes()) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "failed to read message");
                return;
            }
        };

        if bytes.is_empty() {
            debug!(target: DISPATCH_TARGET, "client disconnected without data");
        }

        let channel = self.bus.publish(&bytes);
        debug!(
            target: DISPATCH_TARGET,
            ?channel,
            bytes = bytes.len(),
            "message dispatched"
        );
    }
}
