//! A named collection of glyphs

use std::collections::BTreeMap;

use tracing::debug;

use super::glyph::Glyph;
use crate::data::store::{GlyphSink, GlyphSource};

/// A layer owns its glyphs, keyed by glyph name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layer {
    pub(crate) name: String,
    glyphs: BTreeMap<String, Glyph>,
    /// Whether this layer is the default of the set that owns it.
    /// The owning `LayerSet` keeps this in sync with its default name.
    pub(crate) default: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            glyphs: BTreeMap::new(),
            default: false,
        }
    }

    /// Create a layer that asks to become the default when placed in a set
    pub fn new_default(name: impl Into<String>) -> Self {
        Self {
            default: true,
            ..Self::new(name)
        }
    }

    /// Materialize a layer from a store handle
    pub fn read(
        name: &str,
        source: &dyn GlyphSource,
        default: bool,
    ) -> anyhow::Result<Self> {
        let mut layer = Self::new(name);
        layer.default = default;
        for glyph_name in source.glyph_names()? {
            let mut glyph = source.read_glyph(&glyph_name)?;
            glyph.name = glyph_name.clone();
            layer.glyphs.insert(glyph_name, glyph);
        }
        debug!("Read layer '{}' with {} glyphs", name, layer.len());
        Ok(layer)
    }

    /// Write every glyph to a store handle
    pub fn write(&self, sink: &mut dyn GlyphSink) -> anyhow::Result<()> {
        for glyph in self.glyphs.values() {
            sink.write_glyph(glyph)?;
        }
        sink.finish()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_default(&self) -> bool {
        self.default
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn contains(&self, glyph_name: &str) -> bool {
        self.glyphs.contains_key(glyph_name)
    }

    pub fn get(&self, glyph_name: &str) -> Option<&Glyph> {
        self.glyphs.get(glyph_name)
    }

    pub fn get_mut(&mut self, glyph_name: &str) -> Option<&mut Glyph> {
        self.glyphs.get_mut(glyph_name)
    }

    /// Insert a glyph under its own name, returning any glyph it replaced
    pub fn insert_glyph(&mut self, glyph: Glyph) -> Option<Glyph> {
        self.glyphs.insert(glyph.name.clone(), glyph)
    }

    /// Remove a glyph and hand it back to the caller
    pub fn pop(&mut self, glyph_name: &str) -> Option<Glyph> {
        self.glyphs.remove(glyph_name)
    }

    pub fn glyph_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.glyphs.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Glyph> + '_ {
        self.glyphs.values()
    }
}
