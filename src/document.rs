use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::event::{EditorEvent, EventBus, EventHandler};
use crate::history::SnapshotTarget;
use crate::svg::{self, TreeHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An open SVG file.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    name: String,
    /// Text the tree was last parsed from or serialized to.
    content: String,
    tree: TreeHandle,
}

impl Document {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tree(&self) -> &TreeHandle {
        &self.tree
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            id: self.id,
            name: self.name.clone(),
            content: self.content.clone(),
            tree: TreeHandle::clone(&self.tree),
        }
    }
}

/// Event payload describing a document at the moment it was published.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub id: DocumentId,
    pub name: String,
    pub content: String,
    pub tree: TreeHandle,
}

/// Holds the open documents and tracks which one is active.
#[derive(Debug)]
pub struct DocumentStore {
    documents: Vec<Document>,
    active: Option<usize>,
    event_bus: EventBus,
}

impl DocumentStore {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            documents: Vec::new(),
            active: None,
            event_bus,
        }
    }

    /// Parses `raw` and opens it as the new active document.
    ///
    /// Nothing changes if the text is not a valid SVG document.
    pub fn import_document(&mut self, name: &str, raw: &str) -> EditorResult<DocumentId> {
        let tree = svg::parse(raw).inspect_err(|err| log::warn!("Rejected {}: {}", name, err))?;
        let document = Document {
            id: DocumentId::new(),
            name: name.to_owned(),
            content: raw.to_owned(),
            tree: svg::new_handle(tree),
        };
        let id = document.id;
        let info = document.info();
        self.documents.push(document);
        self.active = Some(self.documents.len() - 1);
        log::info!("Opened {} as {}", name, id);

        self.event_bus.publish(EditorEvent::DocumentSelected(Some(info.clone())));
        self.event_bus.publish(EditorEvent::DocumentLoaded(info));
        Ok(id)
    }

    pub fn select_document(&mut self, id: DocumentId) -> EditorResult<()> {
        let index = self.index_of(id)?;
        self.active = Some(index);
        log::debug!("Switched to {}", self.documents[index].name);
        self.event_bus
            .publish(EditorEvent::DocumentSelected(Some(self.documents[index].info())));
        Ok(())
    }

    /// Closes a document. If it was active, the document that takes its
    /// place (or the new last one) becomes active.
    pub fn close_document(&mut self, id: DocumentId) -> EditorResult<()> {
        let index = self.index_of(id)?;
        let closed = self.documents.remove(index);
        let mut active_changed = false;
        self.active = match self.active {
            Some(active) if active == index => {
                active_changed = true;
                if self.documents.is_empty() {
                    None
                } else {
                    Some(index.min(self.documents.len() - 1))
                }
            }
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        log::info!("Closed {}", closed.name);

        self.event_bus.publish(EditorEvent::DocumentClosed {
            id,
            name: closed.name,
        });
        if active_changed {
            self.event_bus
                .publish(EditorEvent::DocumentSelected(self.active().map(Document::info)));
        }
        Ok(())
    }

    /// Reparses `text` and replaces the document's tree with a fresh one.
    pub fn update_document_content(&mut self, id: DocumentId, text: &str) -> EditorResult<()> {
        let index = self.index_of(id)?;
        let tree = svg::parse(text)?;
        let document = &mut self.documents[index];
        document.content = text.to_owned();
        document.tree = svg::new_handle(tree);
        log::debug!("Replaced content of {}", document.name);

        if self.active == Some(index) {
            self.event_bus
                .publish(EditorEvent::DocumentLoaded(self.documents[index].info()));
        }
        Ok(())
    }

    /// Records text already produced from the live tree, without reparsing.
    pub fn sync_content(&mut self, id: DocumentId, text: &str) {
        match self.documents.iter_mut().find(|document| document.id == id) {
            Some(document) => document.content = text.to_owned(),
            None => log::warn!("Cannot sync content of unknown document {}", id),
        }
    }

    pub fn active(&self) -> Option<&Document> {
        self.active.and_then(|index| self.documents.get(index))
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active().map(Document::id)
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|document| document.id == id)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn index_of(&self, id: DocumentId) -> EditorResult<usize> {
        self.documents
            .iter()
            .position(|document| document.id == id)
            .ok_or(EditorError::UnknownDocument(id))
    }
}

impl SnapshotTarget for DocumentStore {
    fn apply_snapshot(&mut self, document: DocumentId, content: &str) -> EditorResult<()> {
        self.update_document_content(document, content)
    }
}

impl EventHandler for DocumentStore {
    fn handle_event(&mut self, event: &EditorEvent) {
        if let EditorEvent::SnapshotRequested { document, content, .. } = event {
            if let Some(id) = document.or_else(|| self.active_id()) {
                self.sync_content(id, content);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Topic;
    use std::cell::RefCell;
    use std::rc::Rc;

    const SVG: &str = r#"<svg width="10" height="10"><rect/></svg>"#;

    fn recorded(bus: &EventBus) -> Rc<RefCell<Vec<Topic>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        for topic in [Topic::FileLoaded, Topic::FileSelected, Topic::FileClosed] {
            let seen = Rc::clone(&seen);
            bus.subscribe(topic, move |event| seen.borrow_mut().push(event.topic()));
        }
        seen
    }

    #[test]
    fn test_import_publishes_selected_then_loaded() {
        let bus = EventBus::new();
        let seen = recorded(&bus);
        let mut store = DocumentStore::new(bus.clone());
        let id = store.import_document("a.svg", SVG).unwrap();
        assert_eq!(store.active_id(), Some(id));
        assert_eq!(*seen.borrow(), vec![Topic::FileSelected, Topic::FileLoaded]);
    }

    #[test]
    fn test_invalid_import_changes_nothing() {
        let bus = EventBus::new();
        let seen = recorded(&bus);
        let mut store = DocumentStore::new(bus.clone());
        assert!(matches!(
            store.import_document("bad.svg", "<svg>"),
            Err(EditorError::Parse(_))
        ));
        assert!(store.is_empty());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_close_active_activates_same_position() {
        let mut store = DocumentStore::new(EventBus::new());
        let a = store.import_document("a.svg", SVG).unwrap();
        let b = store.import_document("b.svg", SVG).unwrap();
        let c = store.import_document("c.svg", SVG).unwrap();
        store.select_document(b).unwrap();
        store.close_document(b).unwrap();
        assert_eq!(store.active_id(), Some(c));
        store.close_document(c).unwrap();
        assert_eq!(store.active_id(), Some(a));
        store.close_document(a).unwrap();
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn test_close_before_active_keeps_active() {
        let bus = EventBus::new();
        let mut store = DocumentStore::new(bus.clone());
        let a = store.import_document("a.svg", SVG).unwrap();
        let b = store.import_document("b.svg", SVG).unwrap();
        let seen = recorded(&bus);
        store.close_document(a).unwrap();
        assert_eq!(store.active_id(), Some(b));
        assert_eq!(*seen.borrow(), vec![Topic::FileClosed]);
    }

    #[test]
    fn test_update_replaces_tree_handle() {
        let mut store = DocumentStore::new(EventBus::new());
        let id = store.import_document("a.svg", SVG).unwrap();
        let before = TreeHandle::clone(store.get(id).unwrap().tree());
        store.update_document_content(id, "<svg><circle/></svg>").unwrap();
        let document = store.get(id).unwrap();
        assert!(!Rc::ptr_eq(&before, document.tree()));
        assert_eq!(document.content(), "<svg><circle/></svg>");
        assert!(store.update_document_content(id, "oops").is_err());
        assert_eq!(store.get(id).unwrap().content(), "<svg><circle/></svg>");
    }
}
