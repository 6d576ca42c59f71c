use crate::document::DocumentId;
use crate::event::{EditorEvent, EventHandler};
use crate::svg;

/// Editable source text of the active document.
#[derive(Debug, Default)]
pub struct CodeView {
    document: Option<DocumentId>,
    text: String,
    /// Formatted text as of the last load or apply.
    last_applied: String,
}

impl CodeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<DocumentId> {
        self.document
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Buffer handed to the text editor widget.
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
    }

    /// True when the text differs from what was last loaded or applied,
    /// ignoring formatting.
    pub fn is_modified(&self) -> bool {
        self.document.is_some() && svg::format_svg(&self.text).trim() != self.last_applied.trim()
    }

    /// Replaces the text with the formatted `content`.
    pub fn refresh(&mut self, document: DocumentId, content: &str) {
        let formatted = svg::format_svg(content);
        self.document = Some(document);
        self.text = formatted.clone();
        self.last_applied = formatted;
    }

    /// Records `content` as applied without touching the editor text.
    pub fn mark_applied(&mut self, content: &str) {
        self.last_applied = svg::format_svg(content);
    }

    /// Puts the text back to the last applied version.
    pub fn revert(&mut self) {
        self.text = self.last_applied.clone();
    }

    pub fn clear(&mut self) {
        self.document = None;
        self.text.clear();
        self.last_applied.clear();
    }
}

impl EventHandler for CodeView {
    fn handle_event(&mut self, event: &EditorEvent) {
        match event {
            EditorEvent::DocumentLoaded(info) | EditorEvent::DocumentSelected(Some(info)) => {
                self.refresh(info.id, &info.content);
            }
            EditorEvent::DocumentSelected(None) => self.clear(),
            // Attribute and layer edits change the content without a reload.
            EditorEvent::SnapshotRequested {
                document, content, ..
            } => {
                let targets_shown = document.is_none() || *document == self.document;
                if let Some(id) = self.document.filter(|_| targets_shown) {
                    if self.is_modified() {
                        log::debug!("Keeping unapplied code edits for {}", id);
                    } else {
                        self.refresh(id, content);
                    }
                }
            }
            _ => {}
        }
    }
}
