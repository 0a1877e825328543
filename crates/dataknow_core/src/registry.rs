use std::collections::BTreeMap;

use crate::{Document, DocumentId};

/// Ordered collection of documents; the single mutation surface for document state.
///
/// Ids are handed out in increasing order, so key order is intake order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentRegistry {
    documents: BTreeMap<DocumentId, Document>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, docs: impl IntoIterator<Item = Document>) {
        for doc in docs {
            self.documents.insert(doc.id(), doc);
        }
    }

    /// Drops a document in any status. Unknown ids are a no-op.
    pub fn remove(&mut self, id: DocumentId) -> Option<Document> {
        self.documents.remove(&id)
    }

    /// Applies `patch` to the stored document, returning false if it is gone.
    pub fn update(&mut self, id: DocumentId, patch: impl FnOnce(&mut Document)) -> bool {
        match self.documents.get_mut(&id) {
            Some(doc) => {
                patch(doc);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub fn list(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn count(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn any_uploading(&self) -> bool {
        self.documents.values().any(Document::is_uploading)
    }
}
