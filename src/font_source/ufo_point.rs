//! UFO-compliant point data structures
//!
//! Points carry the attributes a glif file allows on a contour point.

use serde::{Deserialize, Serialize};

/// UFO-compliant point type enumeration
/// Maps directly to the UFO specification point types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UfoPointType {
    /// First point in an open contour
    #[serde(rename = "move")]
    Move,
    /// Draws straight line from previous point
    #[serde(rename = "line")]
    Line,
    /// Part of curve segment (control point)
    #[serde(rename = "offcurve")]
    OffCurve,
    /// Draws cubic Bézier curve
    #[serde(rename = "curve")]
    Curve,
    /// Draws quadratic curve
    #[serde(rename = "qcurve")]
    QCurve,
}

impl UfoPointType {
    /// Check if this point type is on-curve (not a control point)
    pub fn is_on_curve(&self) -> bool {
        !matches!(self, UfoPointType::OffCurve)
    }
}

/// A single contour point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UfoPoint {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub point_type: UfoPointType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub smooth: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UfoPoint {
    pub fn new(x: f64, y: f64, point_type: UfoPointType) -> Self {
        Self {
            x,
            y,
            point_type,
            smooth: false,
            name: None,
        }
    }

    pub fn move_to(x: f64, y: f64) -> Self {
        Self::new(x, y, UfoPointType::Move)
    }

    pub fn line_to(x: f64, y: f64) -> Self {
        Self::new(x, y, UfoPointType::Line)
    }

    pub fn off_curve(x: f64, y: f64) -> Self {
        Self::new(x, y, UfoPointType::OffCurve)
    }

    pub fn curve_to(x: f64, y: f64) -> Self {
        Self::new(x, y, UfoPointType::Curve)
    }

    /// Set the smooth flag; ignored for off-curve points
    pub fn with_smooth(mut self, smooth: bool) -> Self {
        if self.point_type.is_on_curve() {
            self.smooth = smooth;
        }
        self
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }
}
