use thiserror::Error;

use crate::document::DocumentId;
use crate::export::ExportError;
use crate::svg::NodePath;
use crate::tools::InteractiveMode;

/// Reasons SVG text is rejected by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("document has no root element")]
    MissingRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("text outside the root element")]
    TextOutsideRoot,

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),
}

/// A layer or node that no longer maps onto the live tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionFailure {
    #[error("no layer with id '{0}'")]
    UnknownLayer(String),

    #[error("layer '{0}' is no longer in the document")]
    LayerLost(String),

    #[error("no element at {0}")]
    NodeLost(NodePath),
}

/// Errors surfaced by editor operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("invalid SVG: {0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Resolution(#[from] ResolutionFailure),

    #[error("{requested} is unavailable while {active} is active")]
    ToolConflict {
        active: InteractiveMode,
        requested: InteractiveMode,
    },

    #[error("no document is open")]
    NoActiveDocument,

    #[error("unknown document {0}")]
    UnknownDocument(DocumentId),

    #[error("name must not be empty")]
    InvalidName,

    #[error("id '{0}' is already used by another element")]
    IdInUse(String),

    #[error("nothing to crop")]
    NothingToCrop,

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

pub type EditorResult<T> = Result<T, EditorError>;

/// User-facing error notice carried by the error event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub title: String,
    pub message: String,
}

impl EditorError {
    pub fn report(&self) -> ErrorReport {
        let title = match self {
            EditorError::Parse(_) => "Invalid SVG",
            EditorError::Resolution(_) => "Element not found",
            EditorError::ToolConflict { .. } => "Tool conflict",
            EditorError::NoActiveDocument | EditorError::UnknownDocument(_) => "No document",
            EditorError::InvalidName | EditorError::IdInUse(_) => "Invalid name",
            EditorError::NothingToCrop => "Cannot crop",
            EditorError::Export(_) => "Export failed",
        };
        ErrorReport {
            title: title.to_owned(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_conflict_report() {
        let err = EditorError::ToolConflict {
            active: InteractiveMode::Crop,
            requested: InteractiveMode::Measure,
        };
        let report = err.report();
        assert_eq!(report.title, "Tool conflict");
        assert_eq!(report.message, "measure is unavailable while crop is active");
    }
}
