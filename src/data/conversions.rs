//! UFO format conversion utilities
//!
//! Conversion between our glyph structures and the norad UFO types. This is
//! pure data transformation; norad owns the glif encoding.

use crate::font_source::{Component, Contour, Glyph, UfoPoint, UfoPointType};

impl Glyph {
    /// Convert from a norad glyph
    pub fn from_norad_glyph(norad_glyph: &norad::Glyph) -> Self {
        let contours = norad_glyph
            .contours
            .iter()
            .map(Contour::from_norad_contour)
            .collect();

        let components = norad_glyph
            .components
            .iter()
            .map(Component::from_norad_component)
            .collect();

        Self {
            name: norad_glyph.name().to_string(),
            width: norad_glyph.width,
            height: norad_glyph.height,
            codepoints: norad_glyph.codepoints.iter().collect(),
            contours,
            components,
        }
    }

    /// Convert back to a norad glyph
    pub fn to_norad_glyph(&self) -> norad::Glyph {
        let mut glyph = norad::Glyph::new(&self.name);
        glyph.width = self.width;
        glyph.height = self.height;

        for &codepoint in &self.codepoints {
            glyph.codepoints.insert(codepoint);
        }

        glyph.contours = self.contours.iter().map(Contour::to_norad_contour).collect();

        // Components whose base is not a valid glyph name cannot be stored
        glyph.components = self
            .components
            .iter()
            .filter_map(Component::to_norad_component)
            .collect();

        glyph
    }
}

impl Component {
    pub fn from_norad_component(norad_component: &norad::Component) -> Self {
        Self {
            base_glyph: norad_component.base.to_string(),
            transform: [
                norad_component.transform.x_scale,
                norad_component.transform.xy_scale,
                norad_component.transform.yx_scale,
                norad_component.transform.y_scale,
                norad_component.transform.x_offset,
                norad_component.transform.y_offset,
            ],
        }
    }

    pub fn to_norad_component(&self) -> Option<norad::Component> {
        let base_name: norad::Name = self.base_glyph.parse().ok()?;

        let transform = norad::AffineTransform {
            x_scale: self.transform[0],
            xy_scale: self.transform[1],
            yx_scale: self.transform[2],
            y_scale: self.transform[3],
            x_offset: self.transform[4],
            y_offset: self.transform[5],
        };

        Some(norad::Component::new(base_name, transform, None))
    }
}

impl Contour {
    pub fn from_norad_contour(norad_contour: &norad::Contour) -> Self {
        let points = norad_contour
            .points
            .iter()
            .map(UfoPoint::from_norad_point)
            .collect();

        Self { points }
    }

    pub fn to_norad_contour(&self) -> norad::Contour {
        let points = self.points.iter().map(UfoPoint::to_norad_point).collect();
        norad::Contour::new(points, None)
    }
}

impl UfoPoint {
    pub fn from_norad_point(norad_point: &norad::ContourPoint) -> Self {
        Self {
            x: norad_point.x,
            y: norad_point.y,
            point_type: UfoPointType::from_norad_point_type(&norad_point.typ),
            smooth: norad_point.smooth,
            name: norad_point.name.as_ref().map(|name| name.to_string()),
        }
    }

    pub fn to_norad_point(&self) -> norad::ContourPoint {
        norad::ContourPoint::new(
            self.x,
            self.y,
            self.point_type.to_norad_point_type(),
            self.smooth,
            self.name.as_deref().and_then(|name| name.parse().ok()),
            None,
        )
    }
}

impl UfoPointType {
    pub fn from_norad_point_type(norad_type: &norad::PointType) -> Self {
        match norad_type {
            norad::PointType::Move => UfoPointType::Move,
            norad::PointType::Line => UfoPointType::Line,
            norad::PointType::OffCurve => UfoPointType::OffCurve,
            norad::PointType::Curve => UfoPointType::Curve,
            norad::PointType::QCurve => UfoPointType::QCurve,
        }
    }

    pub fn to_norad_point_type(&self) -> norad::PointType {
        match self {
            UfoPointType::Move => norad::PointType::Move,
            UfoPointType::Line => norad::PointType::Line,
            UfoPointType::OffCurve => norad::PointType::OffCurve,
            UfoPointType::Curve => norad::PointType::Curve,
            UfoPointType::QCurve => norad::PointType::QCurve,
        }
    }
}
