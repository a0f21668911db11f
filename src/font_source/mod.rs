//! Font source data structures
//!
//! This module contains the in-memory model of a font source package: the
//! layer set, its layers, and the glyphs and guidelines inside them.

pub mod glyph;
pub mod guideline;
pub mod layer;
pub mod layer_set;
pub mod ufo_point;

// Explicit re-exports for public API
pub use glyph::{Component, Contour, Glyph};
pub use guideline::{Guideline, GuidelineError};
pub use layer::Layer;
pub use layer_set::{LayerEntry, LayerSet, Layers, LayersMut, DEFAULT_LAYER_NAME};
pub use ufo_point::{UfoPoint, UfoPointType};
