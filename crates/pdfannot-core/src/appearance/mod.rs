//! Appearance stream generation
//!
//! An [`AppearanceHandler`] writes the `/AP` entry of an annotation. The
//! built-in [`FreeTextAppearanceHandler`] is used unless a caller installs
//! its own through
//! [`FreeTextAnnotation::set_custom_appearance_handler`](crate::FreeTextAnnotation::set_custom_appearance_handler).

pub mod default_appearance;
pub mod free_text;

pub use default_appearance::DefaultAppearance;
pub use free_text::FreeTextAppearanceHandler;

use crate::error::{AnnotationError, Result};
use crate::free_text::FreeTextAnnotation;
use serde::{Deserialize, Serialize};

/// Anything that can build the appearance streams of a free-text annotation.
///
/// The annotation is handed over on every call, so one handler can be shared
/// by many annotations.
pub trait AppearanceHandler {
    fn generate_appearance_streams(&self, annotation: &FreeTextAnnotation) -> Result<()>;
}

/// Settings for the built-in handler, used where the annotation itself is silent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Font resource name when `/DA` has no `Tf`.
    pub font_name: String,
    /// Font size when `/DA` has none or asks for auto size (0).
    pub font_size: f32,
    /// Border width when `/BS` has no `/W`.
    pub border_width: f32,
    /// Gap between the border and the text.
    pub padding: f32,
    /// Baseline distance as a multiple of the font size.
    pub line_height: f32,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            font_name: "Helv".to_string(),
            font_size: 12.0,
            border_width: 1.0,
            padding: 2.0,
            line_height: 1.2,
        }
    }
}

impl AppearanceConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AnnotationError::SerializationError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| AnnotationError::SerializationError(e.to_string()))
    }
}
