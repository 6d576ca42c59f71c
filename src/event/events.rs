use eframe::egui::{Rect, Vec2};

use crate::document::{DocumentId, DocumentInfo};
use crate::error::ErrorReport;
use crate::export::ExportFormat;
use crate::history::{HistoryStatus, Snapshot};
use crate::layer::LayerId;
use crate::selection::{ElementInfo, NodeRef};
use crate::svg::NodePath;
use crate::tools::Measurement;

/// Event channels. Every [`EditorEvent`] variant belongs to exactly one topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    FileLoaded,
    FileSelected,
    FileClosed,
    HistoryChanged,
    HistorySnapshot,
    HistoryUndo,
    HistoryRedo,
    ElementSelected,
    ElementDeselected,
    PropertyChanged,
    LayersRebuilt,
    LayerVisibilityChanged,
    LayerRenamed,
    LayerDeleted,
    ViewZoomed,
    ViewPanned,
    ViewReset,
    ViewFit,
    CropStarted,
    CropCompleted,
    CropCancelled,
    MeasureStarted,
    MeasureCompleted,
    MeasureEnded,
    CodeUpdated,
    OptimizeCompleted,
    ExportRequested,
    ExportCompleted,
    Error,
}

impl Topic {
    /// Stable name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::FileLoaded => "file:loaded",
            Topic::FileSelected => "file:selected",
            Topic::FileClosed => "file:closed",
            Topic::HistoryChanged => "history:changed",
            Topic::HistorySnapshot => "history:snapshot",
            Topic::HistoryUndo => "history:undo",
            Topic::HistoryRedo => "history:redo",
            Topic::ElementSelected => "element:selected",
            Topic::ElementDeselected => "element:deselected",
            Topic::PropertyChanged => "property:changed",
            Topic::LayersRebuilt => "layer:rebuilt",
            Topic::LayerVisibilityChanged => "layer:visibility:changed",
            Topic::LayerRenamed => "layer:renamed",
            Topic::LayerDeleted => "layer:deleted",
            Topic::ViewZoomed => "view:zoomed",
            Topic::ViewPanned => "view:panned",
            Topic::ViewReset => "view:reset",
            Topic::ViewFit => "view:fit",
            Topic::CropStarted => "crop:started",
            Topic::CropCompleted => "crop:completed",
            Topic::CropCancelled => "crop:cancelled",
            Topic::MeasureStarted => "measure:started",
            Topic::MeasureCompleted => "measure:completed",
            Topic::MeasureEnded => "measure:ended",
            Topic::CodeUpdated => "code:updated",
            Topic::OptimizeCompleted => "optimize:completed",
            Topic::ExportRequested => "export:requested",
            Topic::ExportCompleted => "export:completed",
            Topic::Error => "ui:error",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// A document's tree was (re)built and is now authoritative.
    DocumentLoaded(DocumentInfo),
    /// The active document changed; `None` once the last one closed.
    DocumentSelected(Option<DocumentInfo>),
    DocumentClosed {
        id: DocumentId,
        name: String,
    },
    /// Asks the history engine to record the current content.
    /// `document: None` targets the active document.
    SnapshotRequested {
        document: Option<DocumentId>,
        description: String,
        content: String,
    },
    HistoryChanged(HistoryStatus),
    UndoApplied {
        document: DocumentId,
        snapshot: Snapshot,
    },
    RedoApplied {
        document: DocumentId,
        snapshot: Snapshot,
    },
    ElementSelected {
        node: NodeRef,
        info: ElementInfo,
    },
    ElementDeselected,
    PropertyChanged {
        node: NodeRef,
        name: String,
        old_value: Option<String>,
        new_value: String,
    },
    LayersRebuilt {
        document: DocumentId,
        count: usize,
    },
    LayerVisibilityChanged {
        layer_id: LayerId,
        visible: bool,
    },
    LayerRenamed {
        old_id: LayerId,
        new_id: LayerId,
        old_name: String,
        new_name: String,
    },
    LayerDeleted {
        layer_id: LayerId,
        name: String,
        path: NodePath,
    },
    ViewZoomed {
        scale: f32,
    },
    ViewPanned {
        translation: Vec2,
    },
    ViewReset,
    ViewFit {
        scale: f32,
        translation: Vec2,
    },
    CropStarted,
    CropCompleted {
        region: Rect,
    },
    CropCancelled,
    MeasureStarted,
    MeasureCompleted(Measurement),
    MeasureEnded,
    CodeUpdated {
        document: DocumentId,
    },
    OptimizeCompleted {
        document: DocumentId,
        original_size: usize,
        optimized_size: usize,
    },
    ExportRequested {
        file_name: String,
        format: ExportFormat,
    },
    ExportCompleted {
        file_name: String,
        format: ExportFormat,
        size: usize,
    },
    Error(ErrorReport),
}

impl EditorEvent {
    pub fn topic(&self) -> Topic {
        match self {
            EditorEvent::DocumentLoaded(_) => Topic::FileLoaded,
            EditorEvent::DocumentSelected(_) => Topic::FileSelected,
            EditorEvent::DocumentClosed { .. } => Topic::FileClosed,
            EditorEvent::SnapshotRequested { .. } => Topic::HistorySnapshot,
            EditorEvent::HistoryChanged(_) => Topic::HistoryChanged,
            EditorEvent::UndoApplied { .. } => Topic::HistoryUndo,
            EditorEvent::RedoApplied { .. } => Topic::HistoryRedo,
            EditorEvent::ElementSelected { .. } => Topic::ElementSelected,
            EditorEvent::ElementDeselected => Topic::ElementDeselected,
            EditorEvent::PropertyChanged { .. } => Topic::PropertyChanged,
            EditorEvent::LayersRebuilt { .. } => Topic::LayersRebuilt,
            EditorEvent::LayerVisibilityChanged { .. } => Topic::LayerVisibilityChanged,
            EditorEvent::LayerRenamed { .. } => Topic::LayerRenamed,
            EditorEvent::LayerDeleted { .. } => Topic::LayerDeleted,
            EditorEvent::ViewZoomed { .. } => Topic::ViewZoomed,
            EditorEvent::ViewPanned { .. } => Topic::ViewPanned,
            EditorEvent::ViewReset => Topic::ViewReset,
            EditorEvent::ViewFit { .. } => Topic::ViewFit,
            EditorEvent::CropStarted => Topic::CropStarted,
            EditorEvent::CropCompleted { .. } => Topic::CropCompleted,
            EditorEvent::CropCancelled => Topic::CropCancelled,
            EditorEvent::MeasureStarted => Topic::MeasureStarted,
            EditorEvent::MeasureCompleted(_) => Topic::MeasureCompleted,
            EditorEvent::MeasureEnded => Topic::MeasureEnded,
            EditorEvent::CodeUpdated { .. } => Topic::CodeUpdated,
            EditorEvent::OptimizeCompleted { .. } => Topic::OptimizeCompleted,
            EditorEvent::ExportRequested { .. } => Topic::ExportRequested,
            EditorEvent::ExportCompleted { .. } => Topic::ExportCompleted,
            EditorEvent::Error(_) => Topic::Error,
        }
    }
}
