//! Common annotation and markup-annotation attributes
//!
//! `Annotation` is a typed view over the annotation dictionary. It never owns
//! the dictionary exclusively; see [`DocumentObject`].

use crate::cos::DocumentObject;
use lopdf::{Dictionary, Object, Stream};
use serde::{Deserialize, Serialize};

/// Rectangle in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PdfRect {
    /// Build from a `[llx lly urx ury]` array. Corners may come in any order.
    pub fn from_corners(values: &[f32]) -> Option<Self> {
        if values.len() != 4 {
            return None;
        }
        let (x1, y1, x2, y2) = (
            values[0] as f64,
            values[1] as f64,
            values[2] as f64,
            values[3] as f64,
        );
        Some(Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        })
    }

    pub fn to_corners(&self) -> [f32; 4] {
        [
            self.x as f32,
            self.y as f32,
            (self.x + self.width) as f32,
            (self.y + self.height) as f32,
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone)]
pub struct Annotation {
    object: DocumentObject,
}

impl Annotation {
    /// Fresh annotation dictionary with `/Type /Annot` and the given subtype.
    pub fn with_subtype(subtype: &str) -> Self {
        let object = DocumentObject::new();
        object.set_name("Type", "Annot");
        object.set_name("Subtype", subtype);
        Self { object }
    }

    /// Wrap an existing dictionary without touching it.
    pub fn from_object(object: DocumentObject) -> Self {
        Self { object }
    }

    pub fn cos_object(&self) -> &DocumentObject {
        &self.object
    }

    pub fn subtype(&self) -> Option<String> {
        self.object.get_name("Subtype")
    }

    pub fn rect(&self) -> Option<PdfRect> {
        self.object
            .get_float_array("Rect")
            .and_then(|values| PdfRect::from_corners(&values))
    }

    pub fn set_rect(&self, rect: &PdfRect) {
        self.object.set_float_array("Rect", &rect.to_corners());
    }

    pub fn contents(&self) -> Option<String> {
        self.object.get_string("Contents")
    }

    pub fn set_contents(&self, contents: Option<&str>) {
        self.object.set_string("Contents", contents);
    }

    /// Unique name of the annotation on its page (`/NM`).
    pub fn annotation_name(&self) -> Option<String> {
        self.object.get_string("NM")
    }

    pub fn set_annotation_name(&self, name: Option<&str>) {
        self.object.set_string("NM", name);
    }

    pub fn modified_date(&self) -> Option<String> {
        self.object.get_string("M")
    }

    pub fn set_modified_date(&self, date: Option<&str>) {
        self.object.set_string("M", date);
    }

    pub fn flags(&self) -> i64 {
        self.object.get_int("F", 0)
    }

    pub fn set_flags(&self, flags: i64) {
        self.object.set_int("F", flags);
    }

    /// Colour components (`/C`): 0 = transparent, 1 = gray, 3 = RGB, 4 = CMYK.
    pub fn color(&self) -> Option<Vec<f32>> {
        self.object.get_float_array("C")
    }

    pub fn set_color(&self, components: Option<&[f32]>) {
        match components {
            Some(values) => self.object.set_float_array("C", values),
            None => {
                self.object.remove("C");
            }
        }
    }

    pub fn appearance_dictionary(&self) -> Option<Dictionary> {
        self.object.get_dictionary("AP")
    }

    /// The `/N` entry of the appearance dictionary, if it is a stream.
    pub fn normal_appearance(&self) -> Option<Stream> {
        match self.appearance_dictionary()?.get(b"N") {
            Ok(Object::Stream(stream)) => Some(stream.clone()),
            _ => None,
        }
    }

    /// Replace `/AP /N`, keeping any `/R` or `/D` entries already present.
    pub fn set_normal_appearance(&self, stream: Stream) {
        let mut ap = self.appearance_dictionary().unwrap_or_default();
        ap.set("N", Object::Stream(stream));
        self.object.set_dictionary("AP", ap);
    }

    // Markup annotation attributes

    /// Text label of the popup window, usually the author (`/T`).
    pub fn title_popup(&self) -> Option<String> {
        self.object.get_string("T")
    }

    pub fn set_title_popup(&self, title: Option<&str>) {
        self.object.set_string("T", title);
    }

    pub fn subject(&self) -> Option<String> {
        self.object.get_string("Subj")
    }

    pub fn set_subject(&self, subject: Option<&str>) {
        self.object.set_string("Subj", subject);
    }

    pub fn constant_opacity(&self) -> f32 {
        self.object.get_float("CA", 1.0)
    }

    pub fn set_constant_opacity(&self, opacity: f32) {
        self.object.set_float("CA", opacity);
    }

    pub fn rich_contents(&self) -> Option<String> {
        self.object.get_string("RC")
    }

    pub fn set_rich_contents(&self, rich_contents: Option<&str>) {
        self.object.set_string("RC", rich_contents);
    }

    pub fn creation_date(&self) -> Option<String> {
        self.object.get_string("CreationDate")
    }

    pub fn set_creation_date(&self, date: Option<&str>) {
        self.object.set_string("CreationDate", date);
    }

    pub fn intent(&self) -> Option<String> {
        self.object.get_name("IT")
    }

    pub fn set_intent(&self, intent: Option<&str>) {
        match intent {
            Some(name) => self.object.set_name("IT", name),
            None => {
                self.object.remove("IT");
            }
        }
    }
}
