//! Per-document snapshot history.
//!
//! Every edit records the full document text. Undo and redo move a cursor
//! over those snapshots and hand the selected text back to the document
//! store, which reparses it; nothing here holds references into live trees.

mod stack;

pub use stack::{HistoryStack, Snapshot};

use std::collections::HashMap;

use crate::document::DocumentId;
use crate::error::EditorResult;
use crate::event::{EditorEvent, EventBus, EventHandler};

/// Receives the snapshot text chosen by undo or redo.
pub trait SnapshotTarget {
    fn apply_snapshot(&mut self, document: DocumentId, content: &str) -> EditorResult<()>;
}

/// Undo/redo availability for one document, published after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStatus {
    pub document: Option<DocumentId>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub len: usize,
    pub cursor: Option<usize>,
}

#[derive(Debug)]
pub struct HistoryEngine {
    stacks: HashMap<DocumentId, HistoryStack>,
    active: Option<DocumentId>,
    limit: usize,
    event_bus: EventBus,
}

impl HistoryEngine {
    pub fn new(event_bus: EventBus, limit: usize) -> Self {
        Self {
            stacks: HashMap::new(),
            active: None,
            limit,
            event_bus,
        }
    }

    /// Document that snapshot requests without an explicit id are recorded for.
    pub fn active_document(&self) -> Option<DocumentId> {
        self.active
    }

    pub fn record_snapshot(&mut self, document: DocumentId, description: &str, content: &str) {
        let limit = self.limit;
        let stack = self
            .stacks
            .entry(document)
            .or_insert_with(|| HistoryStack::new(limit));
        stack.push(Snapshot::new(description, content));
        log::debug!(
            "Recorded '{}' for {} ({} entries)",
            description,
            document,
            stack.len()
        );
        self.event_bus
            .publish(EditorEvent::HistoryChanged(self.status(Some(document))));
    }

    /// Steps back one snapshot and applies it to `target`.
    ///
    /// Returns `Ok(false)` when there is nothing to undo. If the target
    /// rejects the snapshot the cursor still moves and the error is returned.
    pub fn undo(&mut self, document: DocumentId, target: &mut dyn SnapshotTarget) -> EditorResult<bool> {
        let Some(snapshot) = self
            .stacks
            .get_mut(&document)
            .and_then(|stack| stack.step_back())
            .cloned()
        else {
            return Ok(false);
        };
        log::info!("Undo '{}'", snapshot.description);
        let content = snapshot.content.clone();
        self.event_bus.publish(EditorEvent::UndoApplied { document, snapshot });
        let applied = target.apply_snapshot(document, &content);
        self.event_bus
            .publish(EditorEvent::HistoryChanged(self.status(Some(document))));
        applied.map(|()| true)
    }

    /// Steps forward one snapshot and applies it to `target`.
    pub fn redo(&mut self, document: DocumentId, target: &mut dyn SnapshotTarget) -> EditorResult<bool> {
        let Some(snapshot) = self
            .stacks
            .get_mut(&document)
            .and_then(|stack| stack.step_forward())
            .cloned()
        else {
            return Ok(false);
        };
        log::info!("Redo '{}'", snapshot.description);
        let content = snapshot.content.clone();
        self.event_bus.publish(EditorEvent::RedoApplied { document, snapshot });
        let applied = target.apply_snapshot(document, &content);
        self.event_bus
            .publish(EditorEvent::HistoryChanged(self.status(Some(document))));
        applied.map(|()| true)
    }

    pub fn can_undo(&self, document: DocumentId) -> bool {
        self.stacks.get(&document).is_some_and(HistoryStack::can_undo)
    }

    pub fn can_redo(&self, document: DocumentId) -> bool {
        self.stacks.get(&document).is_some_and(HistoryStack::can_redo)
    }

    pub fn len(&self, document: DocumentId) -> usize {
        self.stacks.get(&document).map_or(0, HistoryStack::len)
    }

    pub fn cursor(&self, document: DocumentId) -> Option<usize> {
        self.stacks.get(&document).and_then(HistoryStack::cursor)
    }

    pub fn entries(&self, document: DocumentId) -> &[Snapshot] {
        self.stacks
            .get(&document)
            .map_or(&[][..], HistoryStack::entries)
    }

    pub fn status(&self, document: Option<DocumentId>) -> HistoryStatus {
        let Some(id) = document else {
            return HistoryStatus::default();
        };
        HistoryStatus {
            document: Some(id),
            can_undo: self.can_undo(id),
            can_redo: self.can_redo(id),
            len: self.len(id),
            cursor: self.cursor(id),
        }
    }

    /// Forgets a document's history.
    pub fn discard(&mut self, document: DocumentId) {
        if self.stacks.remove(&document).is_some() {
            log::debug!("Discarded history of {}", document);
        }
    }
}

impl EventHandler for HistoryEngine {
    fn handle_event(&mut self, event: &EditorEvent) {
        match event {
            EditorEvent::SnapshotRequested {
                document,
                description,
                content,
            } => match document.or(self.active) {
                Some(id) => self.record_snapshot(id, description, content),
                None => log::debug!("Ignoring snapshot '{}' with no open document", description),
            },
            EditorEvent::DocumentSelected(info) => {
                self.active = info.as_ref().map(|info| info.id);
                self.event_bus
                    .publish(EditorEvent::HistoryChanged(self.status(self.active)));
            }
            EditorEvent::DocumentClosed { id, .. } => self.discard(*id),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EditorError, ParseError};

    #[derive(Default)]
    struct Recorder {
        applied: Vec<String>,
        reject: bool,
    }

    impl SnapshotTarget for Recorder {
        fn apply_snapshot(&mut self, _document: DocumentId, content: &str) -> EditorResult<()> {
            if self.reject {
                return Err(EditorError::Parse(ParseError::MissingRoot));
            }
            self.applied.push(content.to_owned());
            Ok(())
        }
    }

    #[test]
    fn test_undo_redo_apply_snapshots() {
        let mut engine = HistoryEngine::new(EventBus::new(), 50);
        let id = DocumentId::new();
        engine.record_snapshot(id, "load file", "A");
        engine.record_snapshot(id, "change fill", "B");
        let mut target = Recorder::default();

        assert_eq!(engine.undo(id, &mut target), Ok(true));
        assert_eq!(engine.undo(id, &mut target), Ok(false));
        assert_eq!(engine.redo(id, &mut target), Ok(true));
        assert_eq!(target.applied, vec!["A", "B"]);
    }

    #[test]
    fn test_rejected_snapshot_keeps_cursor_move() {
        let mut engine = HistoryEngine::new(EventBus::new(), 50);
        let id = DocumentId::new();
        engine.record_snapshot(id, "a", "A");
        engine.record_snapshot(id, "b", "B");
        let mut target = Recorder {
            reject: true,
            ..Default::default()
        };
        assert!(engine.undo(id, &mut target).is_err());
        assert_eq!(engine.cursor(id), Some(0));
    }

    #[test]
    fn test_unknown_document_has_empty_status() {
        let engine = HistoryEngine::new(EventBus::new(), 50);
        let id = DocumentId::new();
        assert!(engine.entries(id).is_empty());
        assert_eq!(engine.status(Some(id)).len, 0);
        assert!(!engine.can_undo(id));
    }
}
