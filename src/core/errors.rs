//! Error types for layer set operations
//!
//! Layer set failures are split by kind so callers can tell a bad font
//! source apart from a bad request. Backing store failures are carried
//! through untouched.

use std::path::Path;

use anyhow::Context;
use thiserror::Error;

/// Result type for layer set operations.
pub type LayerSetResult<T> = std::result::Result<T, LayerSetError>;

/// Errors raised by [`LayerSet`](crate::font_source::LayerSet) and its layers.
#[derive(Error, Debug)]
pub enum LayerSetError {
    /// The layer set (or the store it was read from) is internally inconsistent
    #[error("Invalid layer set structure: {0}")]
    Structural(String),

    /// A layer or glyph name that does not exist was requested
    #[error("{kind} not found: '{name}'")]
    Lookup { kind: &'static str, name: String },

    /// The operation would collide with an existing name or remove the default layer
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed input, such as a bad layer order or an invalid guideline
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Failure reported by the backing store
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl LayerSetError {
    pub(crate) fn missing_layer(name: &str) -> Self {
        Self::Lookup {
            kind: "Layer",
            name: name.to_string(),
        }
    }

    pub(crate) fn missing_glyph(name: &str) -> Self {
        Self::Lookup {
            kind: "Glyph",
            name: name.to_string(),
        }
    }
}

/// Check that a name is acceptable as a UFO layer or glyph name.
pub fn validate_name(name: &str) -> LayerSetResult<()> {
    name.parse::<norad::Name>()
        .map(|_| ())
        .map_err(|e| LayerSetError::Validation(format!("invalid name '{name}': {e}")))
}

/// Check that a path points at a UFO directory.
pub fn validate_ufo_path(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("Font source does not exist: {}", path.display());
    }
    if !path.is_dir() {
        anyhow::bail!("Not a UFO directory: {}", path.display());
    }
    if !path.join("metainfo.plist").exists() {
        anyhow::bail!(
            "Not a valid UFO directory: missing metainfo.plist in {}",
            path.display()
        );
    }
    Ok(())
}

/// Attach the file operation and path to an error.
pub trait BezyContext<T> {
    fn with_file_context(self, operation: &str, path: &Path) -> anyhow::Result<T>;
}

impl<T, E> BezyContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_file_context(self, operation: &str, path: &Path) -> anyhow::Result<T> {
        self.with_context(|| format!("Failed to {operation} {}", path.display()))
    }
}
