//! Application runner logic
//!
//! Reads the layer set, applies the requested command, and writes back.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::cli::{CliArgs, Command};
use crate::data::{shared, NoradStore, SharedStore};
use crate::font_source::LayerSet;

/// Run one CLI command against a font source
pub fn run_app(cli_args: &CliArgs, lazy: bool, out: &mut dyn Write) -> Result<()> {
    cli_args.validate()?;

    let source: SharedStore = shared(NoradStore::open(&cli_args.font_source)?);
    let mut layers = LayerSet::read(source.clone(), lazy)
        .with_context(|| format!("Failed to read layers of {}", cli_args.font_source.display()))?;

    apply_command(&mut layers, &cli_args.command, out)?;

    if !cli_args.command.is_mutating() {
        return Ok(());
    }

    match &cli_args.output {
        Some(output) => {
            let target: SharedStore = shared(NoradStore::create(output));
            layers.write(&target, None)?;
            info!("Saved {} to {}", cli_args.font_source.display(), output.display());
        }
        None => {
            layers.write(&source, None)?;
            info!("Updated {}", cli_args.font_source.display());
        }
    }
    Ok(())
}

/// Apply a command to an in-memory layer set
pub fn apply_command(layers: &mut LayerSet, command: &Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::List => {
            let default = layers.default_layer_name().to_string();
            for name in layers.layer_order() {
                let marker = if name == default { " (default)" } else { "" };
                writeln!(out, "{name}{marker}")?;
            }
        }
        Command::NewLayer { name } => {
            layers.new_layer(name)?;
        }
        Command::DeleteLayer { name } => {
            layers.delete(name)?;
        }
        Command::RenameLayer {
            old,
            new,
            overwrite,
        } => layers.rename_layer(old, new, *overwrite)?,
        Command::RenameGlyph {
            old,
            new,
            overwrite,
        } => layers.rename_glyph(old, new, *overwrite)?,
        Command::Reorder { names } => layers.set_layer_order(names.as_slice())?,
    }
    Ok(())
}
