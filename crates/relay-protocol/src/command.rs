//! Generic decoded commands.

use std::fmt;

use crate::registry::{CommandKind, DELIMITER, Operation};

const TRAILING_PADDING: [char; 3] = ['\r', '\n', '\0'];

/// A decoded unit of the wire protocol.
///
/// Commands are immutable once built. The first token is the primary code;
/// the remaining tokens are its arguments. The original text is preserved
/// for diagnostics even when the primary code is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    kind: CommandKind,
    tokens: Vec<String>,
    raw: String,
}

impl Command {
    /// Semantic kind resolved from the primary code.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// All tokens, primary code first.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tokens after the primary code.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or_default()
    }

    /// Returns the token at `index`, where index 0 is the primary code.
    #[must_use]
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// The primary code exactly as received.
    #[must_use]
    pub fn primary_token(&self) -> &str {
        self.token(0).unwrap_or_default()
    }

    /// Original text, decoded lossily from the received bytes.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Operation resolved from the token at `index`.
    #[must_use]
    pub fn operation_at(&self, index: usize) -> Operation {
        self.token(index).map_or(Operation::Unknown, Operation::from_token)
    }

    /// True when the second token is `ACK` or `NACK`.
    #[must_use]
    pub fn is_response(&self) -> bool {
        matches!(self.operation_at(1), Operation::Ack | Operation::Nack)
    }

    /// True exactly when the command is a response carrying `ACK`.
    #[must_use]
    pub fn is_acknowledgement(&self) -> bool {
        self.is_response() && self.operation_at(1) == Operation::Ack
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Decodes received bytes into a [`Command`].
///
/// Decoding never fails. Bytes are read as UTF-8 (invalid sequences are
/// replaced), trailing line terminators and NUL padding are ignored, and the
/// text is split on `:`. An unrecognised primary code produces
/// [`CommandKind::Unknown`] with every token preserved.
///
/// ```
/// use relay_protocol::{CommandKind, decode};
///
/// let command = decode(b"ZZ:FOO");
/// assert_eq!(command.kind(), CommandKind::Unknown);
/// assert_eq!(command.arguments(), ["FOO"]);
/// ```
#[must_use]
pub fn decode(bytes: &[u8]) -> Command {
    let raw = String::from_utf8_lossy(bytes).into_owned();
    let tokens: Vec<String> = raw
        .trim_end_matches(TRAILING_PADDING)
        .split(DELIMITER)
        .map(str::to_owned)
        .collect();
    let kind = tokens
        .first()
        .map_or(CommandKind::Unknown, |code| CommandKind::from_token(code));
    Command { kind, tokens, raw }
}
