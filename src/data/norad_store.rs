//! Backing store for UFO directories on disk
//!
//! norad parses and writes the package; this adapter exposes it through the
//! [`BackingStore`] contract. The package is parsed when the store is
//! opened, so lazy layer sets only defer the conversion into our glyph
//! types. Nothing reaches the disk until the layer order is committed,
//! which saves the whole package.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use tracing::debug;

use super::store::{BackingStore, GlyphSink, GlyphSource};
use crate::core::errors::{validate_ufo_path, BezyContext};
use crate::font_source::Glyph;

pub struct NoradStore {
    path: PathBuf,
    font: norad::Font,
    /// The default layer was deleted by name. norad cannot drop its default
    /// layer, so it stays until the next default layer write renames it.
    retired_default: bool,
}

impl NoradStore {
    /// Open an existing UFO
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        validate_ufo_path(path)?;
        let font = norad::Font::load(path).with_file_context("load", path)?;
        debug!("Opened UFO at {:?} with {} layers", path, font.layers.len());
        Ok(Self {
            path: path.to_path_buf(),
            font,
            retired_default: false,
        })
    }

    /// Start a new, empty UFO that will be saved to `path`
    pub fn create(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            font: norad::Font::new(),
            retired_default: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn layer(&self, name: &str) -> anyhow::Result<&norad::Layer> {
        self.font
            .layers
            .get(name)
            .ok_or_else(|| anyhow!("layer '{name}' does not exist in {}", self.path.display()))
    }

    /// Make the default layer carry `name`
    fn rename_default(&mut self, name: &str) -> anyhow::Result<()> {
        let current = self.font.layers.default_layer().name().to_string();
        if current != name {
            self.font
                .layers
                .rename_layer(&current, name, true)
                .with_context(|| format!("Failed to rename default layer to '{name}'"))?;
        }
        self.retired_default = false;
        Ok(())
    }
}

struct NoradSource<'a> {
    layer: &'a norad::Layer,
}

impl GlyphSource for NoradSource<'_> {
    fn glyph_names(&self) -> anyhow::Result<Vec<String>> {
        Ok(self
            .layer
            .iter()
            .map(|glyph| glyph.name().to_string())
            .collect())
    }

    fn read_glyph(&self, name: &str) -> anyhow::Result<Glyph> {
        self.layer
            .get_glyph(name)
            .map(Glyph::from_norad_glyph)
            .ok_or_else(|| anyhow!("glyph '{name}' does not exist in layer '{}'", self.layer.name()))
    }
}

struct NoradSink<'a> {
    layer: &'a mut norad::Layer,
}

impl GlyphSink for NoradSink<'_> {
    fn write_glyph(&mut self, glyph: &Glyph) -> anyhow::Result<()> {
        self.layer.insert_glyph(glyph.to_norad_glyph());
        Ok(())
    }
}

impl BackingStore for NoradStore {
    fn layer_names(&self) -> anyhow::Result<Vec<String>> {
        let default_name = self.font.layers.default_layer().name();
        Ok(self
            .font
            .layers
            .iter()
            .filter(|layer| !(self.retired_default && layer.name() == default_name))
            .map(|layer| layer.name().to_string())
            .collect())
    }

    fn default_layer_name(&self) -> anyhow::Result<String> {
        Ok(self.font.layers.default_layer().name().to_string())
    }

    fn open_layer_for_read(
        &self,
        name: &str,
        _is_default: bool,
    ) -> anyhow::Result<Box<dyn GlyphSource + '_>> {
        Ok(Box::new(NoradSource {
            layer: self.layer(name)?,
        }))
    }

    fn existing_layer_names(&self) -> anyhow::Result<BTreeSet<String>> {
        Ok(self.layer_names()?.into_iter().collect())
    }

    fn delete_layer(&mut self, name: &str) -> anyhow::Result<()> {
        if self.default_layer_name()? == name {
            debug!("Default layer '{}' retired until a new default is written", name);
            self.retired_default = true;
            return Ok(());
        }
        self.font
            .layers
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| anyhow!("cannot delete layer '{name}'"))
    }

    fn open_layer_for_write(
        &mut self,
        name: &str,
        is_default: bool,
    ) -> anyhow::Result<Box<dyn GlyphSink + '_>> {
        if is_default {
            self.rename_default(name)?;
        } else if self.retired_default && self.default_layer_name()? == name {
            bail!("cannot write layer '{name}' before the new default layer replaces it");
        } else if self.font.layers.get(name).is_none() {
            self.font
                .layers
                .new_layer(name)
                .with_context(|| format!("Failed to create layer '{name}'"))?;
        }
        let layer = self
            .font
            .layers
            .get_mut(name)
            .ok_or_else(|| anyhow!("layer '{name}' missing after creation"))?;
        layer.clear();
        Ok(Box::new(NoradSink { layer }))
    }

    /// norad keeps the default layer first; the remaining layers are
    /// rebuilt in manifest order before the package is saved.
    fn commit_layer_order(&mut self, order: &[String]) -> anyhow::Result<()> {
        if self.retired_default {
            bail!("default layer was deleted but no new default layer was written");
        }
        let default_name = self.default_layer_name()?;
        for name in order.iter().filter(|name| **name != default_name) {
            let Some(old) = self.font.layers.remove(name) else {
                continue;
            };
            let layer = self
                .font
                .layers
                .new_layer(name)
                .with_context(|| format!("Failed to recreate layer '{name}'"))?;
            for glyph in old.iter() {
                layer.insert_glyph(glyph.clone());
            }
            layer.color = old.color.clone();
            layer.lib = old.lib.clone();
        }

        self.font.save(&self.path).with_file_context("save", &self.path)?;
        debug!("Saved UFO to {:?}", self.path);
        Ok(())
    }
}
