//! Fire-and-forget delivery of commands to the controller.
//!
//! Every send opens a fresh connection, writes the encoded request, and
//! closes the connection without waiting for a reply. Replies arrive later
//! through the listener.

use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use relay_config::{Config, TcpEndpoint};
use relay_protocol::OutboundRequest;

pub(crate) const SENDER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::sender");

/// Errors surfaced while delivering a request.
#[derive(Debug, Error)]
pub enum SendError {
    /// The controller host could not be resolved.
    #[error("failed to resolve controller address {endpoint}: {source}")]
    Resolve {
        /// Configured endpoint.
        endpoint: TcpEndpoint,
        /// Resolver error.
        #[source]
        source: io::Error,
    },
    /// Resolution succeeded without yielding an address.
    #[error("no addresses resolved for controller {endpoint}")]
    ResolveEmpty {
        /// Configured endpoint.
        endpoint: TcpEndpoint,
    },
    /// No resolved address accepted the connection.
    #[error("failed to connect to controller at {endpoint}: {source}")]
    Connect {
        /// Configured endpoint.
        endpoint: TcpEndpoint,
        /// Error from the last attempted address.
        #[source]
        source: io::Error,
    },
    /// The socket stopped accepting bytes before the request was written.
    #[error("short write: {written} of {expected} bytes sent")]
    ShortWrite {
        /// Bytes accepted by the socket.
        written: usize,
        /// Length of the encoded request.
        expected: usize,
    },
    /// Writing or closing the connection failed.
    #[error("failed to write to controller at {endpoint}: {source}")]
    Write {
        /// Configured endpoint.
        endpoint: TcpEndpoint,
        /// Socket error.
        #[source]
        source: io::Error,
    },
}

/// Destination for outbound requests.
#[cfg_attr(test, mockall::automock)]
pub trait TransmissionSink: Send + Sync {
    /// Delivers `request` to the controller.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] when the request could not be delivered in full.
    fn send(&self, request: &OutboundRequest) -> Result<(), SendError>;
}

/// TCP sender targeting the configured controller endpoint.
#[derive(Debug, Clone)]
pub struct TransmissionSender {
    endpoint: TcpEndpoint,
    connect_timeout: Duration,
}

impl TransmissionSender {
    /// Builds a sender for `endpoint`.
    #[must_use]
    pub const fn new(endpoint: TcpEndpoint, connect_timeout: Duration) -> Self {
        Self {
            endpoint,
            connect_timeout,
        }
    }

    /// Builds a sender from the shared configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.controller_endpoint().clone(), config.connect_timeout())
    }

    /// Endpoint requests are delivered to.
    #[must_use]
    pub const fn endpoint(&self) -> &TcpEndpoint {
        &self.endpoint
    }

    fn resolve(&self) -> Result<Vec<SocketAddr>, SendError> {
        let addrs: Vec<SocketAddr> = (self.endpoint.host(), self.endpoint.port())
            .to_socket_addrs()
            .map_err(|source| SendError::Resolve {
                endpoint: self.endpoint.clone(),
                source,
            })?
            .collect();
        if addrs.is_empty() {
            return Err(SendError::ResolveEmpty {
                endpoint: self.endpoint.clone(),
            });
        }
        Ok(addrs)
    }

    fn connect(&self) -> Result<TcpStream, SendError> {
        let mut last_error = None;
        for addr in self.resolve()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(error) => {
                    debug!(
                        target: SENDER_TARGET,
                        %addr,
                        error = %error,
                        "connection attempt failed"
                    );
                    last_error = Some(error);
                }
            }
        }
        Err(SendError::Connect {
            endpoint: self.endpoint.clone(),
            source: last_error.unwrap_or_else(|| io::Error::from(io::ErrorKind::NotConnected)),
        })
    }

    fn write_error(&self, source: io::Error) -> SendError {
        SendError::Write {
            endpoint: self.endpoint.clone(),
            source,
        }
    }
}

impl TransmissionSink for TransmissionSender {
    fn send(&self, request: &OutboundRequest) -> Result<(), SendError> {
        let result = self.connect().and_then(|mut stream| {
            write_request(&mut stream, request.as_bytes(), |source| {
                self.write_error(source)
            })?;
            stream
                .shutdown(Shutdown::Write)
                .map_err(|source| self.write_error(source))
        });
        match &result {
            Ok(()) => debug!(
                target: SENDER_TARGET,
                endpoint = %self.endpoint,
                request = %request,
                bytes = request.len(),
                "request sent"
            ),
            Err(error) => warn!(
                target: SENDER_TARGET,
                endpoint = %self.endpoint,
                request = %request,
                error = %error,
                "request not delivered"
            ),
        }
        result
    }
}

/// Writes all of `bytes`, reporting a write that makes no progress as
/// [`SendError::ShortWrite`].
fn write_request<W, F>(writer: &mut W, bytes: &[u8], on_error: F) -> Result<(), SendError>
where
    W: Write,
    F: Fn(io::Error) -> SendError,
{
    let mut written = 0;
    while written < bytes.len() {
        match writer.write(&bytes[written..]) {
            Ok(0) => {
                return Err(SendError::ShortWrite {
                    written,
                    expected: bytes.len(),
                });
            }
            Ok(count) => written += count,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(on_error(error)),
        }
    }
    writer.flush().map_err(on_error)
}
