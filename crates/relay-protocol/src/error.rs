//! Errors raised by the protocol codec.

use thiserror::Error;

use crate::CommandKind;

/// Failures surfaced while decoding time commands or building timestamps.
///
/// Generic decoding never fails; only the time-sync path can reject input,
/// because an unrecognised time operation is a protocol violation rather
/// than a benign unknown command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A non time-sync command was handed to the time decoder.
    #[error("expected a time command, got {kind}")]
    NotTimeCommand {
        /// Kind of the command that was supplied.
        kind: CommandKind,
    },
    /// The operation token of a time command is not `GET`, `SET`, or `NACK`.
    #[error("unrecognized time operation '{token}'")]
    UnrecognizedTimeOperation {
        /// Token found in the operation position (empty when missing).
        token: String,
    },
    /// The controller clock only represents years 2000 to 2099.
    #[error("year {year} is outside the controller range 2000-2099")]
    YearOutOfRange {
        /// Year that could not be encoded.
        year: i32,
    },
    /// Timestamp components do not describe a real calendar instant.
    #[error("invalid timestamp: {reason}")]
    InvalidTimestamp {
        /// Description of the offending component.
        reason: String,
    },
}
