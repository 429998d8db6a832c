//! Apply free-text operations to PDF documents

use crate::appearance::AppearanceHandler;
use crate::cos::DocumentObject;
use crate::error::{AnnotationError, Result};
use crate::free_text::{FreeTextAnnotation, INTENT_CALLOUT};
use crate::operations::{EditOperation, OperationLog};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::rc::Rc;

/// Apply all operations from the log to a PDF document.
///
/// Every new annotation gets its appearance built before saving, with
/// `handler` when given and the built-in handler otherwise.
pub fn apply_operations(
    pdf_bytes: &[u8],
    log: &OperationLog,
    handler: Option<Rc<dyn AppearanceHandler>>,
) -> Result<Vec<u8>> {
    if log.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut doc = load(pdf_bytes)?;
    let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();

    for (page_num, page_id) in &pages {
        for op in log.operations_for_page(*page_num) {
            let mut annot = build_annotation(op);
            annot.set_custom_appearance_handler(handler.clone());
            annot.construct_appearances()?;
            let annot_id = store_annotation(&mut doc, &annot);
            add_annotation_to_page(&mut doc, *page_id, annot_id)?;
            tracing::debug!(page = page_num, op = op.id(), "Added free-text annotation");
        }
    }

    save(&mut doc)
}

/// Rebuild the appearance of every free-text annotation in the document.
pub fn construct_all_appearances(
    pdf_bytes: &[u8],
    handler: Option<Rc<dyn AppearanceHandler>>,
) -> Result<Vec<u8>> {
    let mut doc = load(pdf_bytes)?;
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    let mut count = 0usize;
    for page_id in page_ids {
        for (annot_id, mut annot) in free_text_annotations(&doc, page_id)? {
            annot.set_custom_appearance_handler(handler.clone());
            annot.construct_appearances()?;
            update_annotation(&mut doc, annot_id, &annot);
            count += 1;
        }
    }
    tracing::debug!(count, "Rebuilt free-text appearances");

    save(&mut doc)
}

fn build_annotation(op: &EditOperation) -> FreeTextAnnotation {
    let annot = FreeTextAnnotation::new();
    match op {
        EditOperation::AddFreeText {
            rect,
            text,
            style,
            quadding,
            author,
            ..
        } => {
            annot.annotation().set_rect(rect);
            annot.annotation().set_contents(Some(text.as_str()));
            annot.set_default_appearance(Some(style.default_appearance().as_str()));
            annot.set_q(*quadding);
            annot.annotation().set_title_popup(author.as_deref());
        }
        EditOperation::AddCallout {
            rect,
            text,
            style,
            callout,
            ..
        } => {
            annot.annotation().set_rect(rect);
            annot.annotation().set_contents(Some(text.as_str()));
            annot.set_default_appearance(Some(style.default_appearance().as_str()));
            annot.annotation().set_intent(Some(INTENT_CALLOUT));
            annot.set_callout(Some(callout.as_slice()));
        }
    }
    annot
}

/// Wrap every free-text annotation referenced from a page's `/Annots`.
///
/// The wrappers view copies of the stored dictionaries; write changes back
/// with [`update_annotation`].
pub fn free_text_annotations(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Vec<(ObjectId, FreeTextAnnotation)>> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| AnnotationError::OperationError(e.to_string()))?;

    let annots = match page.get(b"Annots") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let mut result = Vec::new();
    for item in annots {
        let annot_id = match item {
            Object::Reference(id) => id,
            Object::Dictionary(dict) => {
                if is_free_text(&dict) {
                    tracing::debug!("Skipping inline free-text annotation without an object id");
                }
                continue;
            }
            _ => continue,
        };
        if let Ok(Object::Dictionary(dict)) = doc.get_object(annot_id) {
            if is_free_text(dict) {
                let mut dict = dict.clone();
                if let (Some(_), ap) = stored_appearance(doc, annot_id) {
                    dict.set("AP", Object::Dictionary(ap));
                }
                let object = DocumentObject::from_dictionary(dict);
                result.push((annot_id, FreeTextAnnotation::from_object(object)));
            }
        }
    }
    Ok(result)
}

fn is_free_text(dict: &Dictionary) -> bool {
    matches!(
        dict.get(b"Subtype"),
        Ok(Object::Name(name)) if name == FreeTextAnnotation::SUB_TYPE.as_bytes()
    )
}

/// Add the annotation as a new indirect object.
pub fn store_annotation(doc: &mut Document, annot: &FreeTextAnnotation) -> ObjectId {
    let mut dict = annot.cos_object().to_dictionary();
    if let Some(ap) = appearance_of(&dict) {
        let ap = hoist_appearance_streams(doc, ap, &Dictionary::new());
        dict.set("AP", Object::Dictionary(ap));
    }
    doc.add_object(Object::Dictionary(dict))
}

/// Overwrite the stored dictionary of an existing annotation.
///
/// Appearance streams replace the objects they were stored in before, and a
/// referenced `/AP` dictionary stays referenced.
pub fn update_annotation(doc: &mut Document, annot_id: ObjectId, annot: &FreeTextAnnotation) {
    let (ap_id, previous) = stored_appearance(doc, annot_id);
    let mut dict = annot.cos_object().to_dictionary();
    if let Some(ap) = appearance_of(&dict) {
        let ap = hoist_appearance_streams(doc, ap, &previous);
        match ap_id {
            Some(ap_id) => {
                doc.objects.insert(ap_id, Object::Dictionary(ap));
                dict.set("AP", Object::Reference(ap_id));
            }
            None => dict.set("AP", Object::Dictionary(ap)),
        }
    }
    doc.objects.insert(annot_id, Object::Dictionary(dict));
}

fn appearance_of(dict: &Dictionary) -> Option<Dictionary> {
    match dict.get(b"AP") {
        Ok(Object::Dictionary(ap)) => Some(ap.clone()),
        _ => None,
    }
}

/// The `/AP` dictionary currently stored for an annotation, and its object id
/// when it is an indirect object.
fn stored_appearance(doc: &Document, annot_id: ObjectId) -> (Option<ObjectId>, Dictionary) {
    let Ok(Object::Dictionary(stored)) = doc.get_object(annot_id) else {
        return (None, Dictionary::new());
    };
    match stored.get(b"AP") {
        Ok(Object::Dictionary(ap)) => (None, ap.clone()),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Dictionary(ap)) => (Some(*id), ap.clone()),
            _ => (None, Dictionary::new()),
        },
        _ => (None, Dictionary::new()),
    }
}

/// Streams must be indirect objects, so move `/AP` streams out of the
/// dictionary. A stream goes back into the object that held the same entry
/// in `previous` when there is one.
fn hoist_appearance_streams(
    doc: &mut Document,
    mut ap: Dictionary,
    previous: &Dictionary,
) -> Dictionary {
    for key in [b"N".as_slice(), b"R", b"D"] {
        let hoisted = match ap.get(key) {
            Ok(Object::Stream(stream)) => {
                let slot = previous.get(key).ok();
                store_stream(doc, stream.clone(), slot)
            }
            Ok(Object::Dictionary(states)) => {
                let previous_states = match previous.get(key) {
                    Ok(Object::Dictionary(states)) => states.clone(),
                    _ => Dictionary::new(),
                };
                let mut states = states.clone();
                for (state, value) in states.iter_mut() {
                    if let Object::Stream(stream) = value {
                        let slot = previous_states.get(state).ok();
                        *value = store_stream(doc, stream.clone(), slot);
                    }
                }
                Object::Dictionary(states)
            }
            _ => continue,
        };
        ap.set(key.to_vec(), hoisted);
    }
    ap
}

fn store_stream(doc: &mut Document, stream: Stream, slot: Option<&Object>) -> Object {
    if let Some(Object::Reference(id)) = slot {
        if matches!(doc.get_object(*id), Ok(Object::Stream(_))) {
            doc.objects.insert(*id, Object::Stream(stream));
            return Object::Reference(*id);
        }
    }
    Object::Reference(doc.add_object(stream))
}

fn add_annotation_to_page(doc: &mut Document, page_id: ObjectId, annot_id: ObjectId) -> Result<()> {
    let annots_ref = match doc.get_dictionary(page_id) {
        Ok(page) => match page.get(b"Annots") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        },
        Err(e) => return Err(AnnotationError::OperationError(e.to_string())),
    };

    if let Some(array_id) = annots_ref {
        if let Ok(Object::Array(arr)) = doc.get_object_mut(array_id) {
            arr.push(Object::Reference(annot_id));
            return Ok(());
        }
    }

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| AnnotationError::OperationError(e.to_string()))?;
    if let Ok(Object::Array(arr)) = page.get_mut(b"Annots") {
        arr.push(Object::Reference(annot_id));
    } else {
        page.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
    }
    Ok(())
}

fn load(pdf_bytes: &[u8]) -> Result<Document> {
    Document::load_mem(pdf_bytes).map_err(|e| AnnotationError::ParseError(e.to_string()))
}

fn save(doc: &mut Document) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| AnnotationError::OperationError(e.to_string()))?;
    Ok(output)
}
