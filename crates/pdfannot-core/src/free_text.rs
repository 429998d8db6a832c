//! Free-text annotations
//!
//! A free-text annotation shows text directly on the page. Its look is
//! produced on demand by an [`AppearanceHandler`]: the built-in
//! [`FreeTextAppearanceHandler`] unless a custom one has been installed.

use crate::annotation::Annotation;
use crate::appearance::{AppearanceHandler, FreeTextAppearanceHandler};
use crate::cos::DocumentObject;
use crate::error::Result;
use std::fmt;
use std::rc::Rc;

/// Text justification (`/Q`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadding {
    Left,
    Centered,
    Right,
}

impl Quadding {
    /// `None` for codes outside 0..=2.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Quadding::Left),
            1 => Some(Quadding::Centered),
            2 => Some(Quadding::Right),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Quadding::Left => 0,
            Quadding::Centered => 1,
            Quadding::Right => 2,
        }
    }
}

pub const INTENT_CALLOUT: &str = "FreeTextCallout";
pub const INTENT_TYPEWRITER: &str = "FreeTextTypeWriter";

#[derive(Clone)]
pub struct FreeTextAnnotation {
    annotation: Annotation,
    appearance_handler: Option<Rc<dyn AppearanceHandler>>,
}

impl FreeTextAnnotation {
    pub const SUB_TYPE: &'static str = "FreeText";

    pub fn new() -> Self {
        Self {
            annotation: Annotation::with_subtype(Self::SUB_TYPE),
            appearance_handler: None,
        }
    }

    /// Wrap an existing annotation dictionary. No entries are written.
    pub fn from_object(object: DocumentObject) -> Self {
        Self {
            annotation: Annotation::from_object(object),
            appearance_handler: None,
        }
    }

    /// Common annotation and markup attributes.
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    pub fn cos_object(&self) -> &DocumentObject {
        self.annotation.cos_object()
    }

    /// Default appearance string (`/DA`), e.g. `/Helv 12 Tf 0 g`.
    pub fn default_appearance(&self) -> Option<String> {
        self.cos_object().get_string("DA")
    }

    pub fn set_default_appearance(&self, da: Option<&str>) {
        self.cos_object().set_string("DA", da);
    }

    /// Rich-text default style string (`/DS`).
    pub fn default_style_string(&self) -> Option<String> {
        self.cos_object().get_string("DS")
    }

    /// `None` removes `/DS` instead of storing an empty string.
    pub fn set_default_style_string(&self, ds: Option<&str>) {
        self.cos_object().set_string("DS", ds);
    }

    /// Raw justification code. 0 when `/Q` is missing; unknown codes are returned as stored.
    ///
    /// `/Q` is inheritable from a form-field parent. Resolving that is up to
    /// whoever walks the field tree; this reads the annotation's own entry only.
    pub fn q(&self) -> i64 {
        self.cos_object().get_int("Q", 0)
    }

    pub fn set_q(&self, q: i64) {
        self.cos_object().set_int("Q", q);
    }

    pub fn quadding(&self) -> Option<Quadding> {
        Quadding::from_code(self.q())
    }

    pub fn set_quadding(&self, quadding: Quadding) {
        self.set_q(quadding.code());
    }

    /// Callout line (`/CL`), four or six numbers.
    pub fn callout(&self) -> Option<Vec<f32>> {
        self.cos_object()
            .get_float_array("CL")
            .filter(|points| points.len() == 4 || points.len() == 6)
    }

    pub fn set_callout(&self, points: Option<&[f32]>) {
        match points {
            Some(points) => self.cos_object().set_float_array("CL", points),
            None => {
                self.cos_object().remove("CL");
            }
        }
    }

    /// Insets between `/Rect` and the text box (`/RD`): left, top, right, bottom.
    pub fn rect_differences(&self) -> [f32; 4] {
        match self.cos_object().get_float_array("RD") {
            Some(values) if values.len() == 4 => [values[0], values[1], values[2], values[3]],
            _ => [0.0; 4],
        }
    }

    pub fn set_rect_differences(&self, differences: [f32; 4]) {
        self.cos_object().set_float_array("RD", &differences);
    }

    pub fn is_callout(&self) -> bool {
        self.annotation.intent().as_deref() == Some(INTENT_CALLOUT)
    }

    pub fn is_typewriter(&self) -> bool {
        self.annotation.intent().as_deref() == Some(INTENT_TYPEWRITER)
    }

    /// Install a handler used by [`construct_appearances`](Self::construct_appearances).
    /// `None` goes back to the built-in handler.
    pub fn set_custom_appearance_handler(&mut self, handler: Option<Rc<dyn AppearanceHandler>>) {
        self.appearance_handler = handler;
    }

    pub fn has_custom_appearance_handler(&self) -> bool {
        self.appearance_handler.is_some()
    }

    /// Build the appearance streams with the active handler.
    ///
    /// Exactly one handler runs per call. Its error is returned as is.
    pub fn construct_appearances(&self) -> Result<()> {
        match &self.appearance_handler {
            Some(handler) => {
                tracing::debug!("Constructing free-text appearance with custom handler");
                handler.generate_appearance_streams(self)
            }
            None => {
                tracing::debug!("Constructing free-text appearance with default handler");
                FreeTextAppearanceHandler::default().generate_appearance_streams(self)
            }
        }
    }
}

impl Default for FreeTextAnnotation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FreeTextAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreeTextAnnotation")
            .field("object", self.cos_object())
            .field("custom_handler", &self.has_custom_appearance_handler())
            .finish()
    }
}
