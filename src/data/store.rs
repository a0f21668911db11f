//! The storage contract a layer set reads from and writes to
//!
//! A store owns the persisted form of a font source package: the list of
//! layers, which one is the default, the glyphs inside each layer, and the
//! layer order manifest. The layer set never touches files itself; it only
//! asks a store for handles.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::font_source::Glyph;

/// Read access to one persisted layer
pub trait GlyphSource {
    /// Names of every glyph stored in the layer
    fn glyph_names(&self) -> anyhow::Result<Vec<String>>;

    fn read_glyph(&self, name: &str) -> anyhow::Result<Glyph>;
}

/// Write access to one persisted layer. Opening a sink replaces whatever
/// the layer held before; `finish` is called once after the last glyph.
pub trait GlyphSink {
    fn write_glyph(&mut self, glyph: &Glyph) -> anyhow::Result<()>;

    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A font source package as seen by a layer set
pub trait BackingStore {
    /// Layer names in the package's declared order
    fn layer_names(&self) -> anyhow::Result<Vec<String>>;

    fn default_layer_name(&self) -> anyhow::Result<String>;

    fn open_layer_for_read(
        &self,
        name: &str,
        is_default: bool,
    ) -> anyhow::Result<Box<dyn GlyphSource + '_>>;

    /// Names of the layers currently persisted, used to find orphans on write
    fn existing_layer_names(&self) -> anyhow::Result<BTreeSet<String>>;

    fn delete_layer(&mut self, name: &str) -> anyhow::Result<()>;

    fn open_layer_for_write(
        &mut self,
        name: &str,
        is_default: bool,
    ) -> anyhow::Result<Box<dyn GlyphSink + '_>>;

    /// Persist the layer order manifest. This is the last call of a write.
    fn commit_layer_order(&mut self, order: &[String]) -> anyhow::Result<()>;
}

/// A store shared between the caller and the layer sets reading from it.
///
/// Layer sets are single threaded; sharing one across threads needs
/// external synchronization.
pub type SharedStore = Rc<RefCell<dyn BackingStore>>;

/// Wrap a store so it can be handed to [`LayerSet::read`](crate::font_source::LayerSet::read)
pub fn shared<S: BackingStore + 'static>(store: S) -> Rc<RefCell<S>> {
    Rc::new(RefCell::new(store))
}

