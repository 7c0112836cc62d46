//! Subscription registry for decoded inbound commands.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use relay_protocol::{CodecError, Command, Decoded, TimeCommand, classify, decode};

use super::DISPATCH_TARGET;

/// A non time-sync command together with the bytes it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEvent {
    raw: Vec<u8>,
    command: Command,
}

impl DataEvent {
    /// Pairs received bytes with their decoded command.
    #[must_use]
    pub const fn new(raw: Vec<u8>, command: Command) -> Self {
        Self { raw, command }
    }

    /// Bytes as received from the connection.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Decoded command.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.command
    }
}

/// Outcome of decoding a time-sync command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeEvent {
    /// The command decoded cleanly.
    Command(TimeCommand),
    /// The operation token was not recognised.
    Rejected {
        /// Generic form of the rejected command.
        command: Command,
        /// Why decoding failed.
        error: CodecError,
    },
}

/// Receives data-channel events.
pub trait DataSubscriber: Send + Sync {
    /// Called once per event, on the listener thread.
    fn on_data(&self, event: &DataEvent);
}

impl<F> DataSubscriber for F
where
    F: Fn(&DataEvent) + Send + Sync,
{
    fn on_data(&self, event: &DataEvent) {
        self(event);
    }
}

/// Receives time-channel events.
pub trait TimeSubscriber: Send + Sync {
    /// Called once per event, on the listener thread.
    fn on_time(&self, event: &TimeEvent);
}

impl<F> TimeSubscriber for F
where
    F: Fn(&TimeEvent) + Send + Sync,
{
    fn on_time(&self, event: &TimeEvent) {
        self(event);
    }
}

/// Channel an inbound message was published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Generic data channel.
    Data,
    /// Time-sync channel.
    Time,
}

/// Publish/subscribe hub for inbound commands.
///
/// Subscribers are called synchronously in subscription order. The
/// subscriber lists are only locked while being copied, so a subscriber may
/// register further subscribers without deadlocking.
#[derive(Default)]
pub struct EventBus {
    data: RwLock<Vec<Arc<dyn DataSubscriber>>>,
    time: RwLock<Vec<Arc<dyn TimeSubscriber>>>,
}

impl EventBus {
    /// Creates a bus without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a data-channel subscriber.
    pub fn subscribe_data(&self, subscriber: impl DataSubscriber + 'static) {
        self.subscribe_data_shared(Arc::new(subscriber));
    }

    /// Registers a data-channel subscriber that the caller keeps a handle to.
    pub fn subscribe_data_shared(&self, subscriber: Arc<dyn DataSubscriber>) {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(subscriber);
    }

    /// Registers a time-channel subscriber.
    pub fn subscribe_time(&self, subscriber: impl TimeSubscriber + 'static) {
        self.subscribe_time_shared(Arc::new(subscriber));
    }

    /// Registers a time-channel subscriber that the caller keeps a handle to.
    pub fn subscribe_time_shared(&self, subscriber: Arc<dyn TimeSubscriber>) {
        self.time
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(subscriber);
    }

    /// Decodes `bytes` and publishes the result on the matching channel.
    pub fn publish(&self, bytes: &[u8]) -> Channel {
        let command = decode(bytes);
        debug!(
            target: DISPATCH_TARGET,
            kind = %command.kind(),
            bytes = bytes.len(),
            "command decoded"
        );
        match classify(command.clone()) {
            Ok(Decoded::Generic(generic)) => {
                self.publish_data(&DataEvent::new(bytes.to_vec(), generic));
                Channel::Data
            }
            Ok(Decoded::Time(time)) => {
                self.publish_time(&TimeEvent::Command(time));
                Channel::Time
            }
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    command = %command.raw().trim_end(),
                    error = %error,
                    "time command rejected"
                );
                self.publish_time(&TimeEvent::Rejected { command, error });
                Channel::Time
            }
        }
    }

    /// Delivers `event` to every data subscriber.
    pub fn publish_data(&self, event: &DataEvent) {
        let subscribers = self
            .data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for subscriber in subscribers {
            subscriber.on_data(event);
        }
    }

    /// Delivers `event` to every time subscriber.
    pub fn publish_time(&self, event: &TimeEvent) {
        let subscribers = self
            .time
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for subscriber in subscribers {
            subscriber.on_time(event);
        }
    }

    /// Number of data-channel subscribers.
    #[must_use]
    pub fn data_subscribers(&self) -> usize {
        self.data.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of time-channel subscribers.
    #[must_use]
    pub fn time_subscribers(&self) -> usize {
        self.time.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("data_subscribers", &self.data_subscribers())
            .field("time_subscribers", &self.time_subscribers())
            .finish()
    }
}
