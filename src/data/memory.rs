//! In-memory backing store
//!
//! Holds a package entirely in memory and records every call a layer set
//! makes against it, which is what the I/O behaviour tests assert on.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, bail};

use super::store::{BackingStore, GlyphSink, GlyphSource};
use crate::font_source::Glyph;

/// One recorded store call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    Read(String),
    Write(String),
    Delete(String),
    CommitOrder(Vec<String>),
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    layers: Vec<(String, BTreeMap<String, Glyph>)>,
    default_layer: String,
    calls: RefCell<Vec<StoreCall>>,
}

impl MemoryStore {
    pub fn new(default_layer: impl Into<String>) -> Self {
        Self {
            layers: Vec::new(),
            default_layer: default_layer.into(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Add a persisted layer at the end of the package order
    pub fn with_layer(
        mut self,
        name: impl Into<String>,
        glyphs: impl IntoIterator<Item = Glyph>,
    ) -> Self {
        let glyphs = glyphs
            .into_iter()
            .map(|glyph| (glyph.name().to_string(), glyph))
            .collect();
        self.layers.push((name.into(), glyphs));
        self
    }

    /// Every call made so far, oldest first
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// How many times the named layer has been opened for reading
    pub fn read_count(&self, layer: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, StoreCall::Read(name) if name == layer))
            .count()
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Glyph names persisted in a layer; empty if the layer does not exist
    pub fn glyph_names(&self, layer: &str) -> Vec<String> {
        self.position(layer)
            .map(|i| self.layers[i].1.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn glyph(&self, layer: &str, glyph: &str) -> Option<&Glyph> {
        self.position(layer)
            .and_then(|i| self.layers[i].1.get(glyph))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|(layer, _)| layer == name)
    }

    fn record(&self, call: StoreCall) {
        self.calls.borrow_mut().push(call);
    }
}

struct MemorySource<'a> {
    glyphs: &'a BTreeMap<String, Glyph>,
}

impl GlyphSource for MemorySource<'_> {
    fn glyph_names(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.glyphs.keys().cloned().collect())
    }

    fn read_glyph(&self, name: &str) -> anyhow::Result<Glyph> {
        self.glyphs
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("glyph '{name}' is not stored"))
    }
}

struct MemorySink<'a> {
    glyphs: &'a mut BTreeMap<String, Glyph>,
}

impl GlyphSink for MemorySink<'_> {
    fn write_glyph(&mut self, glyph: &Glyph) -> anyhow::Result<()> {
        self.glyphs.insert(glyph.name().to_string(), glyph.clone());
        Ok(())
    }
}

impl BackingStore for MemoryStore {
    fn layer_names(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.layers.iter().map(|(name, _)| name.clone()).collect())
    }

    fn default_layer_name(&self) -> anyhow::Result<String> {
        Ok(self.default_layer.clone())
    }

    fn open_layer_for_read(
        &self,
        name: &str,
        _is_default: bool,
    ) -> anyhow::Result<Box<dyn GlyphSource + '_>> {
        self.record(StoreCall::Read(name.to_string()));
        let index = self
            .position(name)
            .ok_or_else(|| anyhow!("layer '{name}' is not stored"))?;
        Ok(Box::new(MemorySource {
            glyphs: &self.layers[index].1,
        }))
    }

    fn existing_layer_names(&self) -> anyhow::Result<BTreeSet<String>> {
        Ok(self.layers.iter().map(|(name, _)| name.clone()).collect())
    }

    fn delete_layer(&mut self, name: &str) -> anyhow::Result<()> {
        self.record(StoreCall::Delete(name.to_string()));
        match self.position(name) {
            Some(index) => {
                self.layers.remove(index);
                Ok(())
            }
            None => bail!("layer '{name}' is not stored"),
        }
    }

    fn open_layer_for_write(
        &mut self,
        name: &str,
        is_default: bool,
    ) -> anyhow::Result<Box<dyn GlyphSink + '_>> {
        self.record(StoreCall::Write(name.to_string()));
        if is_default {
            self.default_layer = name.to_string();
        }
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                self.layers.push((name.to_string(), BTreeMap::new()));
                self.layers.len() - 1
            }
        };
        let glyphs = &mut self.layers[index].1;
        glyphs.clear();
        Ok(Box::new(MemorySink { glyphs }))
    }

    fn commit_layer_order(&mut self, order: &[String]) -> anyhow::Result<()> {
        self.record(StoreCall::CommitOrder(order.to_vec()));
        if let Some(unknown) = order.iter().find(|name| !self.has_layer(name)) {
            bail!("cannot order unknown layer '{unknown}'");
        }
        // Layers missing from the manifest keep their relative order at the end.
        let mut remaining = std::mem::take(&mut self.layers);
        for name in order {
            if let Some(index) = remaining.iter().position(|(layer, _)| layer == name) {
                self.layers.push(remaining.remove(index));
            }
        }
        self.layers.extend(remaining);
        Ok(())
    }
}
