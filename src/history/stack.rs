use serde::{Deserialize, Serialize};

use crate::util::time;

/// Full document text recorded after an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub description: String,
    pub content: String,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: u64,
}

impl Snapshot {
    pub fn new(description: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: content.into(),
            timestamp: time::timestamp_millis(),
        }
    }
}

/// Snapshots of one document with a cursor on the current state.
///
/// `cursor` is `None` only while the stack is empty, and otherwise always
/// indexes an existing entry.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<Snapshot>,
    cursor: Option<usize>,
    limit: usize,
}

impl HistoryStack {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            limit: limit.max(1),
        }
    }

    /// Drops any redo entries, appends `snapshot` and moves the cursor onto it.
    /// The oldest entry is evicted once the limit is exceeded.
    pub fn push(&mut self, snapshot: Snapshot) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.limit {
            self.entries.remove(0);
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor + 1 < self.entries.len())
    }

    /// Moves the cursor back and returns the snapshot it now points at.
    pub fn step_back(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        let cursor = self.cursor? - 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor)
    }

    /// Moves the cursor forward and returns the snapshot it now points at.
    pub fn step_forward(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        let cursor = self.cursor? + 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor)
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
