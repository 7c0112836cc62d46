//! Event dispatch between the listener, consumers, and the sender.
//!
//! The [`EventBus`] decodes each inbound message and fans it out to
//! subscribers on one of two channels:
//!
//! - the data channel, carrying every command that is not a time-sync
//!   command, unknown primary codes included
//! - the time channel, carrying decoded time-sync commands or the reason a
//!   time-sync command was rejected
//!
//! Outbound traffic goes the other way through [`RelayLink`], which hands
//! encoded requests to a [`TransmissionSink`](crate::TransmissionSink).

mod bus;
mod handler;
mod link;
mod time_sync;

pub use self::bus::{Channel, DataEvent, DataSubscriber, EventBus, TimeEvent, TimeSubscriber};
pub use self::handler::DispatchConnectionHandler;
pub use self::link::RelayLink;
pub use self::time_sync::{TimeOutcome, TimeSyncMonitor};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
