//! Outbound encoding and inbound classification.

use std::fmt;

use crate::clock::{TimeCommand, TimeOperation, Timestamp, decode_time};
use crate::command::Command;
use crate::error::CodecError;
use crate::registry::{CommandKind, DELIMITER, Operation};

/// A fully encoded command ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutboundRequest {
    text: String,
}

impl OutboundRequest {
    /// Wraps text that is already in wire form.
    #[must_use]
    pub fn from_wire(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Wire text of the request.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Wire bytes of the request.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Number of bytes on the wire.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True when there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Joins a primary code and its arguments into a request.
///
/// ```
/// use relay_protocol::encode_generic;
///
/// assert_eq!(encode_generic("ST", std::iter::empty::<&str>()).as_str(), "ST");
/// assert_eq!(encode_generic("TS", ["ON"]).as_str(), "TS:ON");
/// ```
#[must_use]
pub fn encode_generic<I, S>(primary: &str, rest: I) -> OutboundRequest
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::from(primary);
    for token in rest {
        text.push(DELIMITER);
        text.push_str(token.as_ref());
    }
    OutboundRequest { text }
}

fn primary(kind: CommandKind) -> &'static str {
    kind.token().unwrap_or_default()
}

/// Request for the controller's current clock: `CR:GET`.
#[must_use]
pub fn encode_time_get_request() -> OutboundRequest {
    encode_generic(
        primary(CommandKind::TimeRequest),
        [TimeOperation::Get.token()],
    )
}

/// Command setting the controller clock.
///
/// Produces `CR:SET:<sec>:<min>:<hour>:<weekday>:<day>:<month>:<yearOffset>`
/// with unpadded decimal fields.
#[must_use]
pub fn encode_time_set_request(timestamp: &Timestamp) -> OutboundRequest {
    let fields = [
        timestamp.second().to_string(),
        timestamp.minute().to_string(),
        timestamp.hour().to_string(),
        timestamp.weekday().to_string(),
        timestamp.day().to_string(),
        timestamp.month().to_string(),
        timestamp.year_offset().to_string(),
    ];
    encode_generic(
        primary(CommandKind::TimeRequest),
        std::iter::once(TimeOperation::Set.token().to_owned()).chain(fields),
    )
}

/// Plain status query: `ST`.
#[must_use]
pub fn encode_status_request() -> OutboundRequest {
    encode_generic(primary(CommandKind::Status), std::iter::empty::<&str>())
}

/// Builds a request from a known kind and operation followed by free
/// arguments, for example `TS:ON`.
#[must_use]
pub fn encode_operation<I, S>(kind: CommandKind, operation: Operation, rest: I) -> OutboundRequest
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let head = operation.token().map(str::to_owned);
    let tail = rest.into_iter().map(|token| token.as_ref().to_owned());
    encode_generic(primary(kind), head.into_iter().chain(tail))
}

/// Inbound command routed by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Any command outside the time-sync kind, including unknown ones.
    Generic(Command),
    /// A time-sync command.
    Time(TimeCommand),
}

/// Routes a decoded command to its specialised form.
///
/// # Errors
///
/// Propagates [`CodecError::UnrecognizedTimeOperation`] from
/// [`decode_time`] for time commands with an unknown operation.
pub fn classify(command: Command) -> Result<Decoded, CodecError> {
    if command.kind() == CommandKind::TimeRequest {
        decode_time(&command).map(Decoded::Time)
    } else {
        Ok(Decoded::Generic(command))
    }
}
