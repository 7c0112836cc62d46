//! CLI argument definitions for the relay operator tool.

use clap::{Parser, Subcommand};

/// Command-line interface for sending commands to a relay controller.
#[derive(Parser, Debug)]
#[command(
    name = "relay",
    version,
    about = "Send commands to a relay controller",
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    /// Prints the encoded command instead of sending it.
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// The command to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Commands understood by the relay CLI.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Commands delivered to the controller.
    #[command(flatten)]
    Request(RequestCommand),
    /// Decodes a message locally and prints how the daemon would route it.
    Decode {
        /// Message text, for example `CR:GET:5:30:7:6:20:9:25`.
        #[arg(value_name = "TEXT")]
        text: String,
    },
}

/// Commands that produce an outbound request.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum RequestCommand {
    /// Reads or sets the controller clock.
    Time {
        /// The clock action to perform.
        #[command(subcommand)]
        action: TimeAction,
    },
    /// Sends a status query (`ST`).
    Status,
    /// Sends raw tokens joined with `:`, primary code first.
    Send {
        /// Tokens of the command, for example `TS ON`.
        #[arg(value_name = "TOKEN", required = true, num_args = 1..)]
        tokens: Vec<String>,
    },
}

/// Controller clock actions.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum TimeAction {
    /// Asks the controller to report its clock (`CR:GET`).
    Get,
    /// Sets the controller clock (`CR:SET:...`).
    Set {
        /// Local time to set, as `YYYY-MM-DD HH:MM:SS`; defaults to now.
        #[arg(long, value_name = "YYYY-MM-DD HH:MM:SS")]
        at: Option<String>,
    },
}
