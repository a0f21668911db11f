//! Glyph data held by a layer

use serde::{Deserialize, Serialize};

use super::ufo_point::UfoPoint;

/// A closed or open run of points
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<UfoPoint>,
}

/// A reference to another glyph, placed with an affine transform
/// stored as `[xx, xy, yx, yy, dx, dy]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub base_glyph: String,
    pub transform: [f64; 6],
}

impl Component {
    pub fn new(base_glyph: impl Into<String>) -> Self {
        Self {
            base_glyph: base_glyph.into(),
            transform: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        }
    }
}

/// A single glyph. The name is owned by the glyph and kept in sync with
/// the key it is stored under in its layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub(crate) name: String,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub codepoints: Vec<char>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contours: Vec<Contour>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
}

impl Glyph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: 0.0,
            height: 0.0,
            codepoints: Vec::new(),
            contours: Vec::new(),
            components: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_codepoint(mut self, codepoint: char) -> Self {
        self.codepoints.push(codepoint);
        self
    }

    pub fn with_contour(mut self, contour: Contour) -> Self {
        self.contours.push(contour);
        self
    }
}
