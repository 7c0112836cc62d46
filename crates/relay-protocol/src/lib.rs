//! Wire protocol for relay controllers.
//!
//! Controllers exchange short ASCII commands whose tokens are separated by
//! `:`. The first token is a primary code naming the command category (for
//! example `CR` for the controller clock); the second token usually refines
//! it with an operation such as `GET`, `SET`, or an `ACK`/`NACK`
//! acknowledgement.
//!
//! This crate is stateless. It provides:
//!
//! - [`CommandKind`] and [`Operation`], the token registry
//! - [`decode`], which turns received bytes into a [`Command`] and never fails
//! - [`decode_time`], which specialises a `CR` command into a [`TimeCommand`]
//! - [`classify`], which routes a command into the [`Decoded`] sum type
//! - encoders producing [`OutboundRequest`] values for transmission
//!
//! # Example
//!
//! ```
//! use relay_protocol::{TimeOperation, decode, decode_time};
//!
//! let command = decode(b"CR:GET:5:4:3:2:1:6:24");
//! let time = decode_time(&command).expect("time command");
//! assert_eq!(time.operation(), TimeOperation::Get);
//! assert_eq!(time.timestamp().map(|stamp| stamp.year()), Some(2024));
//! ```

mod clock;
mod codec;
mod command;
mod error;
mod registry;

pub use clock::{
    TIME_REPORT_TOKENS, TimeCommand, TimeOperation, TimeReport, Timestamp, decode_time,
};
pub use codec::{
    Decoded, OutboundRequest, classify, encode_generic, encode_operation, encode_status_request,
    encode_time_get_request, encode_time_set_request,
};
pub use command::{Command, decode};
pub use error::CodecError;
pub use registry::{CommandKind, DELIMITER, Operation};

#[cfg(test)]
mod tests;
