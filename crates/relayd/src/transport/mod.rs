//! Inbound socket listener.
//!
//! The transport module binds the configured TCP endpoint and accepts
//! connections on one background thread. Connections are handed to a
//! [`ConnectionHandler`] one at a time, on that same thread.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub use self::handler::{ConnectionHandler, ReadPolicy};
pub(crate) use self::handler::read_message;
pub use self::listener::{ListenerHandle, RelayListener};
#[cfg(test)]
pub(crate) use self::test_utils::{RecordingHandler, wait_for_served};

pub(crate) const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
