//! Command line tool for the layers of a UFO font source.

use anyhow::Result;
use bezy_layers::{core, logging};

fn run() -> Result<()> {
    let cli_args = core::platform::get_cli_args();
    let config = core::ConfigFile::load().unwrap_or_default();

    // Flushes the log file on drop
    let _log_guard = logging::init(cli_args.log_level(&config), config.log_to_file())?;

    let lazy = cli_args.lazy(&config);
    core::run_app(&cli_args, lazy, &mut std::io::stdout())
}

fn main() {
    if let Err(error) = run() {
        core::platform::handle_error(error);
    }
}
