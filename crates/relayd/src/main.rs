use std::io::{self, Write};
use std::process::ExitCode;

use relayd::{SystemConfigLoader, SystemShutdownSignal, run_service};

fn main() -> ExitCode {
    match run_service(&SystemConfigLoader, &SystemShutdownSignal) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr().lock(), "relayd: {error}");
            ExitCode::FAILURE
        }
    }
}
