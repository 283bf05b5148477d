//! livecfg: Live Configuration Store
//!
//! Entry point for the livecfg command-line tool.

use livecfg::cli::Cli;
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, print_error_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();
    setup_tracing(cli.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    match runtime.block_on(run::execute(cli.command)) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            print_error_hint(&e);
            if e.is_usage() {
                exit_code::USAGE_ERROR
            } else {
                exit_code::runtime_error()
            }
        }
    }
}
