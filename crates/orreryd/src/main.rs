use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match orreryd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // Telemetry may not be installed yet when bootstrap fails.
            let _ = writeln!(io::stderr(), "orreryd: {error}");
            ExitCode::FAILURE
        }
    }
}
