//! Command-line runtime for operating a relay controller.
//!
//! The runtime splits leading configuration flags from the command, loads the
//! shared [`relay_config::Config`], encodes the requested command, and either
//! prints it (`--dry-run`) or hands it to a [`relayd::RelayLink`].
//! Configuration loading, the outbound link, and the IO streams are all
//! substitutable so the runtime can be driven from tests.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use relay_config::Config;
use relayd::{RelayLink, TransmissionSender};

mod cli;
mod command;
mod config;
mod errors;

use cli::Cli;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use errors::AppError;

#[cfg(test)]
mod tests;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Builds the link requests are delivered through for a loaded
/// configuration.
pub(crate) trait LinkFactory {
    fn link(&self, config: &Config) -> RelayLink;
}

/// Delivers requests over TCP to the configured controller endpoint.
pub(crate) struct TcpLinkFactory;

impl LinkFactory for TcpLinkFactory {
    fn link(&self, config: &Config) -> RelayLink {
        RelayLink::new(Arc::new(TransmissionSender::from_config(config)))
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with(args, &mut io, &OrthoConfigLoader, &TcpLinkFactory)
}

/// Runs the CLI with a custom configuration loader and link factory.
pub(crate) fn run_with<I, W, E, L, F>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
    links: &F,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    F: LinkFactory,
{
    let arguments: Vec<OsString> = args.into_iter().collect();
    let ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    } = split_config_arguments(&arguments);

    let cli = match Cli::try_parse_from(command_arguments) {
        Ok(cli) => cli,
        Err(error) => return report_usage(error, io),
    };

    let config = match loader.load(&config_arguments) {
        Ok(config) => config,
        Err(error) => return report_error(&error, io),
    };

    match command::execute(&cli, &config, links, io.stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report_error(&error, io),
    }
}

fn report_usage<W, E>(error: clap::Error, io: &mut IoStreams<'_, W, E>) -> ExitCode
where
    W: Write,
    E: Write,
{
    use clap::error::ErrorKind;

    if matches!(
        error.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    ) {
        let _ = write!(io.stdout, "{error}");
        return ExitCode::SUCCESS;
    }
    report_error(&AppError::CliUsage(error), io)
}

fn report_error<W, E>(error: &AppError, io: &mut IoStreams<'_, W, E>) -> ExitCode
where
    W: Write,
    E: Write,
{
    let _ = writeln!(io.stderr, "{error}");
    ExitCode::FAILURE
}
