//! CLI entrypoint for the relay operator tool.
//!
//! The binary delegates to [`relay_cli::run`], which loads configuration,
//! encodes the requested command, and delivers it to the controller.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    relay_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
