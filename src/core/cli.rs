//! Command line interface for the bezy-layers tool
//!
//! Handles parsing command line arguments and provides validation for
//! user inputs.

use crate::core::config_file::ConfigFile;
use crate::core::errors::validate_ufo_path;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bezy-layers CLI arguments
///
/// Examples:
///   bezy-layers MyFont.ufo list
///   bezy-layers MyFont.ufo new-layer sketches
///   bezy-layers MyFont.ufo rename-layer public.background background
///   bezy-layers MyFont.ufo rename-glyph a a.alt --overwrite
///   bezy-layers MyFont.ufo --output Copy.ufo reorder public.default sketches
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "bezy-layers",
    version,
    about = "Inspect and edit the layers of a UFO font source",
    long_about = "Reads the layers of a UFO font source, applies one change, and writes back only what changed. Layers are loaded on demand unless --eager is given."
)]
pub struct CliArgs {
    /// Path to the UFO to read
    pub font_source: PathBuf,

    /// Load every layer up front instead of on first access
    #[clap(long = "eager")]
    pub eager: bool,

    /// Write the result to a new UFO instead of updating the source
    #[clap(long = "output", short = 'o')]
    pub output: Option<PathBuf>,

    /// Log level filter (overrides the config file)
    #[clap(long = "log-level")]
    pub log_level: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List layers in order, marking the default
    List,
    /// Create an empty layer at the end of the order
    NewLayer { name: String },
    /// Delete a layer (the default layer cannot be deleted)
    DeleteLayer { name: String },
    /// Rename a layer
    RenameLayer {
        old: String,
        new: String,
        #[clap(long)]
        overwrite: bool,
    },
    /// Rename a glyph in every layer
    RenameGlyph {
        old: String,
        new: String,
        #[clap(long)]
        overwrite: bool,
    },
    /// Set the layer order; every layer must be named once
    Reorder {
        #[clap(required = true)]
        names: Vec<String>,
    },
}

impl Command {
    /// Whether the command changes the font source
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Command::List)
    }
}

impl CliArgs {
    /// Validate the CLI arguments after parsing
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_ufo_path(&self.font_source)?;
        if let Some(output) = &self.output {
            if output == &self.font_source {
                anyhow::bail!(
                    "Output is the same as the source: {}\nDrop --output to update in place.",
                    output.display()
                );
            }
            if self.command == Command::List {
                anyhow::bail!("--output has no effect with the list command");
            }
        }
        Ok(())
    }

    /// Whether layers load lazily: --eager, then the config file, then lazy
    pub fn lazy(&self, config: &ConfigFile) -> bool {
        !self.eager && config.lazy()
    }

    /// Log level: --log-level, then the config file, then "info"
    pub fn log_level<'a>(&'a self, config: &'a ConfigFile) -> &'a str {
        self.log_level.as_deref().unwrap_or_else(|| config.log_level())
    }
}
