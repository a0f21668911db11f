//! The ordered, lazily loaded collection of layers in a font source
//!
//! A `LayerSet` behaves partly like an ordered map of layer name to
//! [`Layer`]. When read from a backing store lazily, only the default layer
//! is materialized up front; every other layer stays pending until it is
//! first accessed, and is then kept in memory. Creating, renaming and
//! deleting layers only changes the in-memory set. [`LayerSet::write`]
//! reconciles the set with a store.
//!
//! Invariants held at all times:
//! - the set is never empty
//! - exactly one layer is the default, and it is present in the set
//! - layer names are unique
//! - the default layer cannot be deleted

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use super::layer::Layer;
use crate::core::errors::{validate_name, LayerSetError, LayerSetResult};
use crate::data::store::{BackingStore, SharedStore};

/// Name of the default layer in a new font source
pub const DEFAULT_LAYER_NAME: &str = "public.default";

/// A layer slot: either still on disk or in memory
#[derive(Clone, Debug, PartialEq)]
pub enum LayerEntry {
    Pending(String),
    Loaded(Layer),
}

impl LayerEntry {
    pub fn is_pending(&self) -> bool {
        matches!(self, LayerEntry::Pending(_))
    }

    pub fn loaded(&self) -> Option<&Layer> {
        match self {
            LayerEntry::Loaded(layer) => Some(layer),
            LayerEntry::Pending(_) => None,
        }
    }
}

/// Access to the store pending entries are loaded from.
///
/// The strong handle is only held while something is still pending.
#[derive(Default)]
struct LazySource {
    store: Option<SharedStore>,
    pending: usize,
}

impl LazySource {
    /// Load a pending entry in place and return the layer
    fn force<'e>(
        &mut self,
        name: &str,
        entry: &'e mut LayerEntry,
        is_default: bool,
    ) -> LayerSetResult<&'e mut Layer> {
        if entry.is_pending() {
            let layer = self.load(name, is_default)?;
            *entry = LayerEntry::Loaded(layer);
            self.forget_pending();
        }
        match entry {
            LayerEntry::Loaded(layer) => Ok(layer),
            LayerEntry::Pending(_) => Err(LayerSetError::Structural(format!(
                "layer '{name}' is still pending after loading"
            ))),
        }
    }

    fn load(&self, name: &str, is_default: bool) -> LayerSetResult<Layer> {
        let store = self.store.as_ref().ok_or_else(|| {
            LayerSetError::Structural(format!(
                "layer '{name}' is pending but no backing store is attached"
            ))
        })?;
        let store = store.borrow();
        load_layer(&*store, name, is_default)
    }

    /// A pending entry was loaded or dropped
    fn forget_pending(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 && self.store.take().is_some() {
            debug!("All layers loaded, releasing backing store");
        }
    }
}

fn load_layer(store: &dyn BackingStore, name: &str, is_default: bool) -> LayerSetResult<Layer> {
    let source = store.open_layer_for_read(name, is_default)?;
    let layer = Layer::read(name, source.as_ref(), is_default)?;
    debug!("Loaded layer '{}'", name);
    Ok(layer)
}

/// An ordered mapping of layer names to layers
pub struct LayerSet {
    order: Vec<String>,
    entries: HashMap<String, LayerEntry>,
    default_name: String,
    lazy: LazySource,
    /// The store this set was read from; identity only, does not keep it alive
    origin: Option<Weak<RefCell<dyn BackingStore>>>,
}

impl Default for LayerSet {
    /// A set holding a single, empty `public.default` layer
    fn default() -> Self {
        let mut set = Self::empty(DEFAULT_LAYER_NAME);
        let layer = Layer::new_default(DEFAULT_LAYER_NAME);
        set.push(DEFAULT_LAYER_NAME.to_string(), LayerEntry::Loaded(layer));
        set
    }
}

impl LayerSet {
    fn empty(default_name: &str) -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
            default_name: default_name.to_string(),
            lazy: LazySource::default(),
            origin: None,
        }
    }

    fn push(&mut self, name: String, entry: LayerEntry) {
        self.order.push(name.clone());
        self.entries.insert(name, entry);
    }

    /// Build a set from layers that are already in memory.
    ///
    /// The default layer is, in order of preference: `default_layer_name`,
    /// the one layer flagged as default, the only layer, or the layer named
    /// `public.default`. No layers at all gives a set with a single empty
    /// default layer.
    pub fn from_layers(
        layers: impl IntoIterator<Item = Layer>,
        default_layer_name: Option<&str>,
    ) -> LayerSetResult<Self> {
        let mut set = Self::empty(DEFAULT_LAYER_NAME);
        let mut flagged = Vec::new();
        for layer in layers {
            if set.entries.contains_key(&layer.name) {
                return Err(LayerSetError::Structural(format!(
                    "duplicate layer name: '{}'",
                    layer.name
                )));
            }
            if layer.default {
                flagged.push(layer.name.clone());
            }
            set.push(layer.name.clone(), LayerEntry::Loaded(layer));
        }

        if set.order.is_empty() {
            if let Some(name) = default_layer_name {
                return Err(LayerSetError::Structural(format!(
                    "default layer '{name}' given for an empty layer set"
                )));
            }
            return Ok(Self::default());
        }

        if flagged.len() > 1 {
            return Err(LayerSetError::Structural(format!(
                "more than one default layer: {}",
                flagged.join(", ")
            )));
        }

        let default_name = match (default_layer_name, flagged.first()) {
            (Some(name), Some(flag)) if name != flag.as_str() => {
                return Err(LayerSetError::Structural(format!(
                    "default layer '{name}' conflicts with layer '{flag}' marked as default"
                )));
            }
            (Some(name), _) => {
                if !set.contains(name) {
                    return Err(LayerSetError::Structural(format!(
                        "default layer '{name}' is not among the specified layers"
                    )));
                }
                name.to_string()
            }
            (None, Some(flag)) => flag.clone(),
            (None, None) if set.order.len() == 1 => set.order[0].clone(),
            (None, None) if set.contains(DEFAULT_LAYER_NAME) => DEFAULT_LAYER_NAME.to_string(),
            (None, None) => {
                return Err(LayerSetError::Structural(
                    "default layer not specified".to_string(),
                ));
            }
        };

        set.default_name = default_name;
        for (name, entry) in set.entries.iter_mut() {
            if let LayerEntry::Loaded(layer) = entry {
                layer.default = *name == set.default_name;
            }
        }
        Ok(set)
    }

    /// Read the layer set of a package from a store.
    ///
    /// The default layer is always loaded. Other layers are loaded now when
    /// `lazy` is false, otherwise on first access.
    pub fn read(store: SharedStore, lazy: bool) -> LayerSetResult<Self> {
        let (names, default_name) = {
            let store = store.borrow();
            (store.layer_names()?, store.default_layer_name()?)
        };

        let mut set = Self::empty(&default_name);
        for name in names {
            if set.entries.contains_key(&name) {
                return Err(LayerSetError::Structural(format!(
                    "store lists layer '{name}' more than once"
                )));
            }
            let is_default = name == default_name;
            let entry = if is_default || !lazy {
                LayerEntry::Loaded(load_layer(&*store.borrow(), &name, is_default)?)
            } else {
                set.lazy.pending += 1;
                LayerEntry::Pending(name.clone())
            };
            set.push(name, entry);
        }

        if !set.entries.contains_key(&default_name) {
            return Err(LayerSetError::Structural(format!(
                "default layer '{default_name}' is not among the store's layers"
            )));
        }

        debug!(
            "Read layer set with {} layers ({} pending), default '{}'",
            set.len(),
            set.lazy.pending,
            default_name
        );
        set.origin = Some(Rc::downgrade(&store));
        if set.lazy.pending > 0 {
            set.lazy.store = Some(store);
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always false for a valid set
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether the named layer is in memory; false for unknown names
    pub fn is_loaded(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|entry| !entry.is_pending())
    }

    /// Whether a backing store is still held for pending layers
    pub fn has_store(&self) -> bool {
        self.lazy.store.is_some()
    }

    pub fn default_layer_name(&self) -> &str {
        &self.default_name
    }

    /// Layer names in the current order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Get a layer, loading it if needed
    pub fn get(&mut self, name: &str) -> LayerSetResult<&Layer> {
        self.get_mut(name).map(|layer| &*layer)
    }

    pub fn get_mut(&mut self, name: &str) -> LayerSetResult<&mut Layer> {
        let is_default = name == self.default_name;
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| LayerSetError::missing_layer(name))?;
        self.lazy.force(name, entry, is_default)
    }

    /// Like [`get`](Self::get), but an unknown name gives `None`
    pub fn get_opt(&mut self, name: &str) -> LayerSetResult<Option<&Layer>> {
        if !self.contains(name) {
            return Ok(None);
        }
        self.get(name).map(Some)
    }

    pub fn default_layer(&mut self) -> LayerSetResult<&Layer> {
        let name = self.default_name.clone();
        self.get(&name)
    }

    pub fn default_layer_mut(&mut self) -> LayerSetResult<&mut Layer> {
        let name = self.default_name.clone();
        self.get_mut(&name)
    }

    /// Iterate over the layers in order, loading pending ones as they are reached
    pub fn layers(&mut self) -> Layers<'_> {
        Layers(self.layers_mut())
    }

    pub fn layers_mut(&mut self) -> LayersMut<'_> {
        let mut by_name: HashMap<&str, &mut LayerEntry> = self
            .entries
            .iter_mut()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        let ordered: Vec<_> = self
            .order
            .iter()
            .filter_map(|name| by_name.remove_entry(name.as_str()))
            .collect();
        LayersMut {
            entries: ordered.into_iter(),
            default_name: &self.default_name,
            lazy: &mut self.lazy,
        }
    }

    /// Load every pending layer into memory
    pub fn unlazify(&mut self) -> LayerSetResult<()> {
        for layer in self.layers_mut() {
            layer?;
        }
        Ok(())
    }

    /// Remove a layer from the set. The default layer cannot be removed.
    pub fn delete(&mut self, name: &str) -> LayerSetResult<LayerEntry> {
        if name == self.default_name {
            return Err(LayerSetError::Conflict(format!(
                "cannot delete default layer '{name}'"
            )));
        }
        let entry = self
            .entries
            .remove(name)
            .ok_or_else(|| LayerSetError::missing_layer(name))?;
        self.order.retain(|key| key != name);
        if entry.is_pending() {
            self.lazy.forget_pending();
        }
        debug!("Deleted layer '{}'", name);
        Ok(entry)
    }

    /// Create an empty layer at the end of the order
    pub fn new_layer(&mut self, name: &str) -> LayerSetResult<&mut Layer> {
        validate_name(name)?;
        if self.contains(name) {
            return Err(LayerSetError::Conflict(format!(
                "layer '{name}' already exists"
            )));
        }
        self.push(name.to_string(), LayerEntry::Loaded(Layer::new(name)));
        debug!("Created layer '{}'", name);
        self.get_mut(name)
    }

    /// The current layer order. Changing the returned list does not
    /// change the set; use [`set_layer_order`](Self::set_layer_order).
    pub fn layer_order(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Reorder the layers. `order` must name every layer exactly once.
    pub fn set_layer_order<S: AsRef<str>>(&mut self, order: &[S]) -> LayerSetResult<()> {
        let mut seen = HashSet::new();
        for name in order {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(LayerSetError::Validation(format!(
                    "layer order names unknown layer '{name}'"
                )));
            }
            if !seen.insert(name) {
                return Err(LayerSetError::Validation(format!(
                    "layer order names '{name}' more than once"
                )));
            }
        }
        if seen.len() != self.order.len() {
            let missing: Vec<&str> = self
                .keys()
                .filter(|name| !seen.contains(name))
                .collect();
            return Err(LayerSetError::Validation(format!(
                "layer order is missing layers: {}",
                missing.join(", ")
            )));
        }
        self.order = order.iter().map(|name| name.as_ref().to_string()).collect();
        Ok(())
    }

    /// Rename a layer. The renamed layer moves to the end of the order.
    ///
    /// With `overwrite`, an existing layer called `new` is dropped first;
    /// the default layer can never be dropped this way.
    pub fn rename_layer(&mut self, old: &str, new: &str, overwrite: bool) -> LayerSetResult<()> {
        if old == new {
            return Ok(());
        }
        if !self.contains(old) {
            return Err(LayerSetError::missing_layer(old));
        }
        validate_name(new)?;
        if self.contains(new) {
            if !overwrite {
                return Err(LayerSetError::Conflict(format!(
                    "target layer name '{new}' already exists"
                )));
            }
            if new == self.default_name {
                return Err(LayerSetError::Conflict(format!(
                    "cannot overwrite default layer '{new}'"
                )));
            }
        }

        // the layer object is needed to update its own name
        self.get_mut(old)?;

        if self.contains(new) {
            self.delete(new)?;
        }
        let Some(mut entry) = self.entries.remove(old) else {
            return Err(LayerSetError::missing_layer(old));
        };
        if let LayerEntry::Loaded(layer) = &mut entry {
            layer.name = new.to_string();
        }
        self.entries.insert(new.to_string(), entry);
        self.order.retain(|key| key != old);
        self.order.push(new.to_string());
        if old == self.default_name {
            self.default_name = new.to_string();
        }
        debug!("Renamed layer '{}' to '{}'", old, new);
        Ok(())
    }

    /// Rename a glyph in every layer that has it.
    ///
    /// Either every layer is updated or, on error, none is. Without
    /// `overwrite`, any layer already holding `new` is a conflict; with it,
    /// `new` is first removed from every layer.
    pub fn rename_glyph(&mut self, old: &str, new: &str, overwrite: bool) -> LayerSetResult<()> {
        if old == new {
            return Ok(());
        }
        validate_name(new)?;
        self.unlazify()?;

        let loaded: Vec<&Layer> = self
            .order
            .iter()
            .filter_map(|name| self.entries.get(name).and_then(LayerEntry::loaded))
            .collect();
        if !loaded.iter().any(|layer| layer.contains(old)) {
            return Err(LayerSetError::missing_glyph(old));
        }
        if !overwrite {
            if let Some(layer) = loaded.iter().find(|layer| layer.contains(new)) {
                return Err(LayerSetError::Conflict(format!(
                    "target glyph name '{new}' already exists in layer '{}'",
                    layer.name()
                )));
            }
        }

        for entry in self.entries.values_mut() {
            let LayerEntry::Loaded(layer) = entry else {
                continue;
            };
            if overwrite {
                layer.pop(new);
            }
            if let Some(mut glyph) = layer.pop(old) {
                glyph.name = new.to_string();
                layer.insert_glyph(glyph);
            }
        }
        debug!("Renamed glyph '{}' to '{}' in all layers", old, new);
        Ok(())
    }

    /// Reconcile the set with a store.
    ///
    /// `save_as` defaults to whether `target` is a different store from the
    /// one this set was read from. Writing in place deletes layers the store
    /// still has but the set no longer does, and skips pending layers since
    /// their stored content is already current. Saving elsewhere loads every
    /// pending layer first. The layer order is committed last.
    pub fn write(&mut self, target: &SharedStore, save_as: Option<bool>) -> LayerSetResult<()> {
        let save_as = save_as.unwrap_or_else(|| !self.was_read_from(target));

        if !save_as {
            let orphans: Vec<String> = target
                .borrow()
                .existing_layer_names()?
                .into_iter()
                .filter(|name| !self.contains(name))
                .collect();
            let mut store = target.borrow_mut();
            for name in &orphans {
                debug!("Deleting layer '{}' from store", name);
                store.delete_layer(name)?;
            }
        }

        let mut written = 0;
        for name in &self.order {
            let is_default = *name == self.default_name;
            let Some(entry) = self.entries.get_mut(name) else {
                continue;
            };
            if entry.is_pending() && !save_as {
                debug!("Skipping unread layer '{}'", name);
                continue;
            }
            let layer = self.lazy.force(name, entry, is_default)?;
            let mut store = target.borrow_mut();
            let mut sink = store.open_layer_for_write(name, is_default)?;
            layer.write(sink.as_mut())?;
            written += 1;
        }

        target.borrow_mut().commit_layer_order(&self.order)?;
        info!(
            "Wrote {} of {} layers{}",
            written,
            self.len(),
            if save_as { " (save as)" } else { "" }
        );
        Ok(())
    }

    fn was_read_from(&self, store: &SharedStore) -> bool {
        self.origin
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|origin| std::ptr::addr_eq(Rc::as_ptr(&origin), Rc::as_ptr(store)))
    }
}

/// Iterator over a set's layers, in order
pub struct LayersMut<'a> {
    entries: std::vec::IntoIter<(&'a str, &'a mut LayerEntry)>,
    default_name: &'a str,
    lazy: &'a mut LazySource,
}

impl<'a> Iterator for LayersMut<'a> {
    type Item = LayerSetResult<&'a mut Layer>;

    fn next(&mut self) -> Option<Self::Item> {
        let (name, entry) = self.entries.next()?;
        Some(self.lazy.force(name, entry, name == self.default_name))
    }
}

pub struct Layers<'a>(LayersMut<'a>);

impl<'a> Iterator for Layers<'a> {
    type Item = LayerSetResult<&'a Layer>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|layer| layer.map(|layer| &*layer))
    }
}

impl fmt::Debug for LayerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.len();
        write!(
            f,
            "<LayerSet ({} layer{}, default '{}')>",
            n,
            if n == 1 { "" } else { "s" },
            self.default_name
        )
    }
}

#[derive(Serialize)]
struct LayerRecord<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    default: bool,
}

/// Serializes as the ordered list of `{"name": ..., "default": true}`
/// records, without loading pending layers.
impl Serialize for LayerSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for name in &self.order {
            seq.serialize_element(&LayerRecord {
                name: name.as_str(),
                default: *name == self.default_name,
            })?;
        }
        seq.end()
    }
}
