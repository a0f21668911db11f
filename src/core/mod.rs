//! Core application functionality
//!
//! This module contains the application-level pieces around the layer set:
//! - Error types
//! - CLI handling and the user configuration file
//! - The command runner

pub mod cli;
pub mod config_file;
pub mod errors;
pub mod platform;
pub mod runner;

// Re-export commonly used items
pub use cli::{CliArgs, Command};
pub use config_file::ConfigFile;
pub use errors::{LayerSetError, LayerSetResult};
pub use runner::run_app;
