//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use relay_protocol::CodecError;
use relayd::SendError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("invalid time '{input}', expected YYYY-MM-DD HH:MM:SS: {source}")]
    InvalidTime {
        input: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("{0}")]
    Codec(#[from] CodecError),
    #[error("{0}")]
    Send(#[from] SendError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
