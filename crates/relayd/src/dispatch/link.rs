//! Request point for outbound commands.

use std::sync::Arc;

use tracing::info;

use relay_protocol::{
    OutboundRequest, Timestamp, encode_status_request, encode_time_get_request,
    encode_time_set_request,
};

use crate::sender::{SendError, TransmissionSink};

use super::DISPATCH_TARGET;

/// Forwards encoded requests to a [`TransmissionSink`] on the caller's
/// thread.
///
/// The link never waits for a reply; answers from the controller arrive
/// asynchronously on the [`EventBus`](super::EventBus).
#[derive(Clone)]
pub struct RelayLink {
    sink: Arc<dyn TransmissionSink>,
}

impl RelayLink {
    /// Creates a link delivering through `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn TransmissionSink>) -> Self {
        Self { sink }
    }

    /// Sends a pre-encoded request.
    ///
    /// # Errors
    ///
    /// Propagates the [`SendError`] reported by the sink.
    pub fn send(&self, request: &OutboundRequest) -> Result<(), SendError> {
        info!(
            target: DISPATCH_TARGET,
            request = %request,
            "sending transmission"
        );
        self.sink.send(request)
    }

    /// Asks the controller to report its clock (`CR:GET`).
    ///
    /// # Errors
    ///
    /// Propagates the [`SendError`] reported by the sink.
    pub fn request_time(&self) -> Result<(), SendError> {
        self.send(&encode_time_get_request())
    }

    /// Sets the controller clock.
    ///
    /// # Errors
    ///
    /// Propagates the [`SendError`] reported by the sink.
    pub fn set_time(&self, timestamp: &Timestamp) -> Result<(), SendError> {
        self.send(&encode_time_set_request(timestamp))
    }

    /// Sends a status query (`ST`).
    ///
    /// # Errors
    ///
    /// Propagates the [`SendError`] reported by the sink.
    pub fn request_status(&self) -> Result<(), SendError> {
        self.send(&encode_status_request())
    }
}

impl std::fmt::Debug for RelayLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayLink").finish_non_exhaustive()
    }
}
