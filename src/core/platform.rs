//! Process-level setup and error handling.

use clap::Parser;

use crate::core::cli::CliArgs;

/// Handle application errors: print to stderr and exit with code 1.
pub fn handle_error(error: anyhow::Error) -> ! {
    eprintln!();
    eprintln!("Error:");
    eprintln!("{error:#}");
    eprintln!();
    eprintln!("Try running with --help for usage information.");
    std::process::exit(1);
}

/// Parse the command line arguments.
pub fn get_cli_args() -> CliArgs {
    CliArgs::parse()
}
