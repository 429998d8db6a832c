//! Appearance dispatch through the public API

use lopdf::{dictionary, Object};
use pdfannot_core::{
    AnnotationError, AppearanceHandler, DocumentObject, FreeTextAnnotation,
    FreeTextAppearanceHandler, PdfRect, Result,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

/// Records which annotations it was asked to render, by their `/NM`.
#[derive(Default)]
struct RecordingHandler {
    seen: RefCell<Vec<Option<String>>>,
}

impl AppearanceHandler for RecordingHandler {
    fn generate_appearance_streams(&self, annotation: &FreeTextAnnotation) -> Result<()> {
        self.seen
            .borrow_mut()
            .push(annotation.annotation().annotation_name());
        Ok(())
    }
}

/// Delegates to the built-in handler after tagging the annotation.
struct TaggingHandler {
    inner: FreeTextAppearanceHandler,
}

impl AppearanceHandler for TaggingHandler {
    fn generate_appearance_streams(&self, annotation: &FreeTextAnnotation) -> Result<()> {
        annotation.annotation().set_subject(Some("tagged"));
        self.inner.generate_appearance_streams(annotation)
    }
}

fn rect() -> PdfRect {
    PdfRect {
        x: 72.0,
        y: 72.0,
        width: 144.0,
        height: 36.0,
    }
}

#[test]
fn fresh_annotation_has_free_text_subtype() {
    let annot = FreeTextAnnotation::new();
    assert_eq!(
        annot.cos_object().get_name("Subtype"),
        Some(FreeTextAnnotation::SUB_TYPE.to_string())
    );
}

#[test]
fn wrapped_object_reads_defaults() {
    let object = DocumentObject::from_dictionary(dictionary! {
        "Type" => "Annot",
        "Subtype" => "FreeText",
    });
    let annot = FreeTextAnnotation::from_object(object);
    assert_eq!(annot.q(), 0);
    assert_eq!(annot.default_appearance(), None);
    assert_eq!(annot.default_style_string(), None);
}

#[test]
fn two_wrappers_over_one_object_see_each_other() {
    let object = DocumentObject::new();
    let first = FreeTextAnnotation::from_object(object.clone());
    let second = FreeTextAnnotation::from_object(object);

    first.set_default_style_string(Some("font-size:10pt"));
    assert_eq!(
        second.default_style_string(),
        Some("font-size:10pt".to_string())
    );

    second.set_default_style_string(None);
    assert!(!first.cos_object().contains_key("DS"));
}

#[test]
fn one_handler_serves_many_annotations() {
    let handler = Rc::new(RecordingHandler::default());
    let shared: Rc<dyn AppearanceHandler> = handler.clone();

    let mut annots = Vec::new();
    for name in ["a", "b", "c"] {
        let mut annot = FreeTextAnnotation::new();
        annot.annotation().set_annotation_name(Some(name));
        annot.set_custom_appearance_handler(Some(shared.clone()));
        annots.push(annot);
    }
    for annot in &annots {
        annot.construct_appearances().unwrap();
    }

    assert_eq!(
        *handler.seen.borrow(),
        vec![
            Some("a".to_string()),
            Some("b".to_string()),
            Some("c".to_string())
        ]
    );
}

#[test]
fn replacing_handler_drops_previous_one() {
    let first = Rc::new(RecordingHandler::default());
    let second = Rc::new(RecordingHandler::default());
    let first_dyn: Rc<dyn AppearanceHandler> = first.clone();
    let second_dyn: Rc<dyn AppearanceHandler> = second.clone();

    let mut annot = FreeTextAnnotation::new();
    annot.set_custom_appearance_handler(Some(first_dyn));
    annot.set_custom_appearance_handler(Some(second_dyn));
    annot.construct_appearances().unwrap();

    assert!(first.seen.borrow().is_empty());
    assert_eq!(second.seen.borrow().len(), 1);
}

#[test]
fn custom_handler_can_wrap_the_default() {
    let mut annot = FreeTextAnnotation::new();
    annot.annotation().set_rect(&rect());
    annot.annotation().set_contents(Some("Wrapped"));
    let handler: Rc<dyn AppearanceHandler> = Rc::new(TaggingHandler {
        inner: FreeTextAppearanceHandler::default(),
    });
    annot.set_custom_appearance_handler(Some(handler));

    annot.construct_appearances().unwrap();

    assert_eq!(annot.annotation().subject(), Some("tagged".to_string()));
    let stream = annot.annotation().normal_appearance().unwrap();
    assert!(matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Form"));
}

#[test]
fn default_handler_output_lands_in_shared_object() {
    let object = DocumentObject::new();
    let annot = FreeTextAnnotation::from_object(object.clone());
    annot.annotation().set_rect(&rect());
    annot.annotation().set_contents(Some("Shared"));

    annot.construct_appearances().unwrap();

    assert!(object.get_dictionary("AP").is_some());
}

#[test]
fn handler_failure_reaches_caller_unchanged() {
    struct Broken;
    impl AppearanceHandler for Broken {
        fn generate_appearance_streams(&self, _annotation: &FreeTextAnnotation) -> Result<()> {
            Err(AnnotationError::EncodeError("bad operand".to_string()))
        }
    }

    let mut annot = FreeTextAnnotation::new();
    let handler: Rc<dyn AppearanceHandler> = Rc::new(Broken);
    annot.set_custom_appearance_handler(Some(handler));

    let err = annot.construct_appearances().unwrap_err();
    assert!(matches!(err, AnnotationError::EncodeError(ref msg) if msg == "bad operand"));
    assert_eq!(
        err.to_string(),
        "Failed to encode appearance stream: bad operand"
    );
}
