//! Free-text annotations over a lopdf object graph
//!
//! This crate provides a typed view of PDF free-text annotations and
//! pluggable generation of their appearance streams.
//!
//! - [`DocumentObject`]: shared, typed access to an annotation dictionary
//! - [`FreeTextAnnotation`]: `/DA`, `/DS`, `/Q` and friends, plus
//!   [`construct_appearances`](FreeTextAnnotation::construct_appearances)
//! - [`AppearanceHandler`]: the strategy that writes `/AP`; replaceable at runtime
//! - [`apply_operations`]: record edits and apply them to a PDF file

pub mod annotation;
pub mod appearance;
pub mod apply_operations;
pub mod cos;
pub mod error;
pub mod free_text;
pub mod operations;
pub mod style;

pub use annotation::{Annotation, PdfRect};
pub use appearance::{
    AppearanceConfig, AppearanceHandler, DefaultAppearance, FreeTextAppearanceHandler,
};
pub use apply_operations::{apply_operations, construct_all_appearances, free_text_annotations};
pub use cos::DocumentObject;
pub use error::{AnnotationError, Result};
pub use free_text::{FreeTextAnnotation, Quadding};
pub use operations::{EditOperation, OperationLog};
pub use style::TextStyle;

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| AnnotationError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}
