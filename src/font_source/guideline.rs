//! Guidelines
//!
//! A guideline is either a vertical line (x only), a horizontal line (y only),
//! or an angled line through a point (x, y and angle). Which combination of
//! fields is present is checked once, when the guideline is built; the fields
//! cannot be changed afterwards, so a different guideline means building a new
//! one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::errors::LayerSetError;

/// Reasons a set of guideline fields is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GuidelineError {
    #[error("x or y must be present")]
    MissingCoordinate,
    #[error("if 'x' or 'y' are None, 'angle' must not be present")]
    AngleWithSingleCoordinate,
    #[error("if 'x' and 'y' are defined, 'angle' must be defined")]
    MissingAngle,
    #[error("angle must be between 0 and 360, got {0}")]
    AngleOutOfRange(f64),
}

impl From<GuidelineError> for LayerSetError {
    fn from(err: GuidelineError) -> Self {
        LayerSetError::Validation(err.to_string())
    }
}

/// The raw field set, before validation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct GuidelineFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
}

/// A validated guideline
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Guideline {
    fields: GuidelineFields,
}

impl<'de> Deserialize<'de> for Guideline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let fields = GuidelineFields::deserialize(deserializer)?;
        Guideline::from_fields(fields).map_err(serde::de::Error::custom)
    }
}

fn check_geometry(x: Option<f64>, y: Option<f64>, angle: Option<f64>) -> Result<(), GuidelineError> {
    match (x, y, angle) {
        (None, None, _) => Err(GuidelineError::MissingCoordinate),
        (Some(_), None, Some(_)) | (None, Some(_), Some(_)) => {
            Err(GuidelineError::AngleWithSingleCoordinate)
        }
        (Some(_), Some(_), None) => Err(GuidelineError::MissingAngle),
        (_, _, Some(angle)) if !(0.0..=360.0).contains(&angle) => {
            Err(GuidelineError::AngleOutOfRange(angle))
        }
        _ => Ok(()),
    }
}

impl Guideline {
    fn from_fields(fields: GuidelineFields) -> Result<Self, GuidelineError> {
        check_geometry(fields.x, fields.y, fields.angle)?;
        Ok(Self { fields })
    }

    /// Build a guideline from its geometric fields
    pub fn new(
        x: Option<f64>,
        y: Option<f64>,
        angle: Option<f64>,
    ) -> Result<Self, GuidelineError> {
        Self::from_fields(GuidelineFields {
            x,
            y,
            angle,
            ..Default::default()
        })
    }

    /// A vertical guideline through `x`
    pub fn vertical(x: f64) -> Self {
        Self {
            fields: GuidelineFields {
                x: Some(x),
                ..Default::default()
            },
        }
    }

    /// A horizontal guideline through `y`
    pub fn horizontal(y: f64) -> Self {
        Self {
            fields: GuidelineFields {
                y: Some(y),
                ..Default::default()
            },
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.fields.name = Some(name.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.fields.color = Some(color.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.fields.identifier = Some(identifier.into());
        self
    }

    pub fn x(&self) -> Option<f64> {
        self.fields.x
    }

    pub fn y(&self) -> Option<f64> {
        self.fields.y
    }

    pub fn angle(&self) -> Option<f64> {
        self.fields.angle
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.name.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.fields.color.as_deref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.fields.identifier.as_deref()
    }
}
