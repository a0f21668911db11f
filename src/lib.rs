//! Bezy layers
//!
//! Lazily loaded, order-preserving layer sets for UFO font sources.
pub mod core;
pub mod data;
pub mod font_source;
pub mod logging;
#[cfg(test)]
mod tests;

pub use crate::core::errors::{LayerSetError, LayerSetResult};
pub use crate::data::{BackingStore, MemoryStore, NoradStore, SharedStore};
pub use crate::font_source::{Glyph, Guideline, Layer, LayerEntry, LayerSet};
