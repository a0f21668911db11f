//! Backing stores for layer sets
//!
//! The [`store`] module defines what a layer set needs from persistent
//! storage. [`MemoryStore`] keeps a package in memory, [`NoradStore`]
//! reads and writes UFO directories through norad.

pub mod conversions;
pub mod memory;
pub mod norad_store;
pub mod store;

pub use memory::{MemoryStore, StoreCall};
pub use norad_store::NoradStore;
pub use store::{shared, BackingStore, GlyphSink, GlyphSource, SharedStore};
