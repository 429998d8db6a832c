//! Operation log for free-text annotation edits
//!
//! Edits are recorded first and applied to a document in one pass by
//! [`apply_operations`](crate::apply_operations::apply_operations).

use crate::annotation::PdfRect;
use crate::style::TextStyle;
use serde::{Deserialize, Serialize};

pub type OpId = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum EditOperation {
    AddFreeText {
        id: OpId,
        page: u32,
        rect: PdfRect,
        text: String,
        style: TextStyle,
        /// Raw `/Q` code, stored as given.
        #[serde(default)]
        quadding: i64,
        #[serde(default)]
        author: Option<String>,
    },
    /// Free text with a callout line pointing at `callout` (`/CL`).
    AddCallout {
        id: OpId,
        page: u32,
        rect: PdfRect,
        text: String,
        style: TextStyle,
        callout: Vec<f32>,
    },
}

impl EditOperation {
    pub fn id(&self) -> OpId {
        match self {
            EditOperation::AddFreeText { id, .. } => *id,
            EditOperation::AddCallout { id, .. } => *id,
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            EditOperation::AddFreeText { page, .. } => *page,
            EditOperation::AddCallout { page, .. } => *page,
        }
    }

    fn set_id(&mut self, new_id: OpId) {
        match self {
            EditOperation::AddFreeText { id, .. } => *id = new_id,
            EditOperation::AddCallout { id, .. } => *id = new_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationLog {
    next_id: OpId,
    operations: Vec<EditOperation>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an operation. The id it carries is replaced by a fresh one, which is returned.
    pub fn add(&mut self, mut op: EditOperation) -> OpId {
        let id = self.next_id;
        self.next_id += 1;
        op.set_id(id);
        self.operations.push(op);
        id
    }

    pub fn remove(&mut self, id: OpId) -> bool {
        match self.operations.iter().position(|op| op.id() == id) {
            Some(pos) => {
                self.operations.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    pub fn operations_for_page(&self, page: u32) -> Vec<&EditOperation> {
        self.operations
            .iter()
            .filter(|op| op.page() == page)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
