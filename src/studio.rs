//! Composition root of the editor.
//!
//! [`Studio`] owns every component, wires their subscriptions on one bus
//! and exposes the operations the UI calls. Every failed operation is also
//! published as [`EditorEvent::Error`].

use eframe::egui::{Pos2, Rect, Vec2};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::code_view::CodeView;
use crate::config::StudioConfig;
use crate::document::{DocumentId, DocumentStore};
use crate::error::{EditorError, EditorResult};
use crate::event::{EditorEvent, EventBus, Subscription, Topic, attach};
use crate::export::{ExportOptions, ExportRequest, ExportedFile, Exporter, run_export};
use crate::history::{HistoryEngine, HistoryStatus};
use crate::layer::{LayerId, LayerIndex};
use crate::optimize::{self, Optimized};
use crate::property::PropertyMutator;
use crate::selection::{NodeRef, Selection};
use crate::svg::{NodePath, TreeHandle};
use crate::tools::{MeasureUnit, Measurement, Tools};
use crate::view::ViewState;

pub struct Studio {
    config: StudioConfig,
    event_bus: EventBus,
    documents: Rc<RefCell<DocumentStore>>,
    history: Rc<RefCell<HistoryEngine>>,
    layers: Rc<RefCell<LayerIndex>>,
    selection: Rc<RefCell<Selection>>,
    view: Rc<RefCell<ViewState>>,
    tools: Rc<RefCell<Tools>>,
    code_view: Rc<RefCell<CodeView>>,
    properties: PropertyMutator,
    subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("documents", &self.documents.borrow().len())
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(StudioConfig::default())
    }
}

impl Studio {
    pub fn new(config: StudioConfig) -> Self {
        let event_bus = EventBus::new();
        let documents = Rc::new(RefCell::new(DocumentStore::new(event_bus.clone())));
        let history = Rc::new(RefCell::new(HistoryEngine::new(
            event_bus.clone(),
            config.history_limit,
        )));
        let layers = Rc::new(RefCell::new(LayerIndex::new(event_bus.clone())));
        let selection = Rc::new(RefCell::new(Selection::new(event_bus.clone())));
        let view = Rc::new(RefCell::new(ViewState::new(event_bus.clone(), config.view.clone())));
        let tools = Rc::new(RefCell::new(Tools::new(event_bus.clone(), config.measure_unit)));
        let code_view = Rc::new(RefCell::new(CodeView::new()));
        let properties = PropertyMutator::new(event_bus.clone());

        // Subscription order is dispatch order: the store syncs its text
        // before history records it, and layers rebuild before selection
        // and view look at a new tree.
        let mut subscriptions = Vec::new();
        subscriptions.extend(attach(&event_bus, &[Topic::HistorySnapshot], &documents));
        subscriptions.extend(attach(
            &event_bus,
            &[Topic::HistorySnapshot, Topic::FileSelected, Topic::FileClosed],
            &history,
        ));
        subscriptions.extend(attach(
            &event_bus,
            &[Topic::FileLoaded, Topic::FileSelected, Topic::PropertyChanged],
            &layers,
        ));
        subscriptions.extend(attach(
            &event_bus,
            &[
                Topic::FileLoaded,
                Topic::FileSelected,
                Topic::FileClosed,
                Topic::LayerDeleted,
                Topic::PropertyChanged,
                Topic::CropStarted,
                Topic::CropCompleted,
                Topic::CropCancelled,
            ],
            &selection,
        ));
        subscriptions.extend(attach(
            &event_bus,
            &[
                Topic::FileLoaded,
                Topic::FileSelected,
                Topic::CropStarted,
                Topic::CropCompleted,
                Topic::CropCancelled,
            ],
            &view,
        ));
        subscriptions.extend(attach(&event_bus, &[Topic::FileLoaded, Topic::FileSelected], &tools));
        subscriptions.extend(attach(
            &event_bus,
            &[Topic::FileLoaded, Topic::FileSelected, Topic::HistorySnapshot],
            &code_view,
        ));
        log::debug!("Studio wired with {} subscriptions", subscriptions.len());

        Self {
            config,
            event_bus,
            documents,
            history,
            layers,
            selection,
            view,
            tools,
            code_view,
            properties,
            subscriptions,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// The bus every component publishes on. Subscribe here to observe the editor.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn documents(&self) -> Ref<'_, DocumentStore> {
        self.documents.borrow()
    }

    pub fn history(&self) -> Ref<'_, HistoryEngine> {
        self.history.borrow()
    }

    pub fn layers(&self) -> Ref<'_, LayerIndex> {
        self.layers.borrow()
    }

    pub fn selection(&self) -> Ref<'_, Selection> {
        self.selection.borrow()
    }

    pub fn view(&self) -> Ref<'_, ViewState> {
        self.view.borrow()
    }

    pub fn tools(&self) -> Ref<'_, Tools> {
        self.tools.borrow()
    }

    pub fn code_view(&self) -> Ref<'_, CodeView> {
        self.code_view.borrow()
    }

    /// Mutable access to the code editor buffer. Release it before calling
    /// any other operation.
    pub fn code_view_mut(&self) -> RefMut<'_, CodeView> {
        self.code_view.borrow_mut()
    }

    pub fn active_document(&self) -> Option<DocumentId> {
        self.documents.borrow().active_id()
    }

    fn require_active(&self) -> EditorResult<DocumentId> {
        self.active_document().ok_or(EditorError::NoActiveDocument)
    }

    fn active_tree(&self) -> EditorResult<TreeHandle> {
        self.documents
            .borrow()
            .active()
            .map(|document| TreeHandle::clone(document.tree()))
            .ok_or(EditorError::NoActiveDocument)
    }

    /// Publishes a failed result as an error event and passes it through.
    fn report<T>(&self, result: EditorResult<T>) -> EditorResult<T> {
        if let Err(err) = &result {
            log::warn!("{}", err);
            self.event_bus.publish(EditorEvent::Error(err.report()));
        }
        result
    }

    // Documents

    /// Opens `text` as a new document and records it as the first history entry.
    pub fn import_document(&self, name: &str, text: &str) -> EditorResult<DocumentId> {
        let imported = self.documents.borrow_mut().import_document(name, text);
        if let Ok(id) = imported {
            self.event_bus.publish(EditorEvent::SnapshotRequested {
                document: Some(id),
                description: "load file".to_owned(),
                content: text.to_owned(),
            });
        }
        self.report(imported)
    }

    pub fn select_document(&self, id: DocumentId) -> EditorResult<()> {
        let result = self.documents.borrow_mut().select_document(id);
        self.report(result)
    }

    pub fn close_document(&self, id: DocumentId) -> EditorResult<()> {
        let result = self.documents.borrow_mut().close_document(id);
        self.report(result)
    }

    // History

    pub fn undo(&self) -> EditorResult<bool> {
        let result = self.require_active().and_then(|id| {
            let mut documents = self.documents.borrow_mut();
            self.history.borrow_mut().undo(id, &mut *documents)
        });
        self.report(result)
    }

    pub fn redo(&self) -> EditorResult<bool> {
        let result = self.require_active().and_then(|id| {
            let mut documents = self.documents.borrow_mut();
            self.history.borrow_mut().redo(id, &mut *documents)
        });
        self.report(result)
    }

    pub fn history_status(&self) -> HistoryStatus {
        self.history.borrow().status(self.active_document())
    }

    // Selection and properties

    /// Selects the element at `path` in the active document.
    pub fn select_node(&self, path: NodePath) -> EditorResult<()> {
        let result = self
            .active_tree()
            .and_then(|tree| self.selection.borrow_mut().select(NodeRef::new(tree, path)));
        self.report(result)
    }

    /// Selects what a click on `path` should select; the root deselects.
    pub fn select_at(&self, path: &NodePath) -> EditorResult<()> {
        let result = self
            .active_tree()
            .and_then(|tree| self.selection.borrow_mut().select_at(&tree, path));
        self.report(result)
    }

    pub fn deselect(&self) {
        self.selection.borrow_mut().deselect();
    }

    pub fn selected_node(&self) -> Option<NodeRef> {
        self.selection.borrow().selected().cloned()
    }

    pub fn set_attribute(&self, node: &NodeRef, name: &str, value: &str) -> EditorResult<()> {
        let result = self
            .properties
            .set_attribute(self.active_document(), node, name, value);
        self.report(result)
    }

    pub fn set_text(&self, node: &NodeRef, text: &str) -> EditorResult<()> {
        let result = self.properties.set_text(self.active_document(), node, text);
        self.report(result)
    }

    // Layers

    pub fn select_layer(&self, id: &LayerId) -> EditorResult<()> {
        let node = self.layers.borrow().node_for(id);
        let result = node.and_then(|node| self.selection.borrow_mut().select(node));
        self.report(result)
    }

    /// The layer holding the current selection, if any.
    pub fn highlighted_layer(&self) -> Option<LayerId> {
        let selection = self.selection.borrow();
        self.layers
            .borrow()
            .highlighted_layer(selection.selected())
            .map(|layer| layer.id.clone())
    }

    pub fn set_layer_visibility(&self, id: &LayerId, visible: bool) -> EditorResult<()> {
        let result = self.layers.borrow_mut().set_visibility(id, visible);
        self.report(result)
    }

    pub fn toggle_layer_visibility(&self, id: &LayerId) -> EditorResult<bool> {
        let result = self.layers.borrow_mut().toggle_visibility(id);
        self.report(result)
    }

    pub fn delete_layer(&self, id: &LayerId) -> EditorResult<()> {
        let result = self.layers.borrow_mut().delete_layer(id);
        self.report(result)
    }

    pub fn rename_layer(&self, id: &LayerId, new_name: &str) -> EditorResult<LayerId> {
        let result = self.layers.borrow_mut().rename_layer(id, new_name);
        self.report(result)
    }

    // View

    /// Records the canvas size used for centred zoom and fitting.
    pub fn set_canvas_size(&self, size: Vec2) {
        let mut view = self.view.borrow_mut();
        let first = view.container().is_none();
        view.set_container(size);
        if first {
            view.fit(size);
        }
    }

    pub fn zoom_in(&self) {
        let mut view = self.view.borrow_mut();
        let container = view.container().unwrap_or(Vec2::ZERO);
        view.zoom_in(container);
    }

    pub fn zoom_out(&self) {
        let mut view = self.view.borrow_mut();
        let container = view.container().unwrap_or(Vec2::ZERO);
        view.zoom_out(container);
    }

    pub fn zoom_at(&self, factor: f32, point: Pos2) {
        self.view.borrow_mut().zoom_at_point(factor, point);
    }

    pub fn pan(&self, delta: Vec2) {
        self.view.borrow_mut().pan(delta);
    }

    pub fn reset_view(&self) {
        self.view.borrow_mut().reset();
    }

    pub fn fit_view(&self) {
        let mut view = self.view.borrow_mut();
        if let Some(container) = view.container() {
            view.fit(container);
        }
    }

    // Crop and measure

    pub fn start_crop(&self) -> EditorResult<()> {
        let has_document = self.active_document().is_some();
        let result = self.tools.borrow_mut().start_crop(has_document);
        self.report(result)
    }

    /// Sets the crop region directly, in document coordinates.
    pub fn set_crop_region(&self, region: Rect) {
        self.tools.borrow_mut().crop_mut().set_region(region);
    }

    pub fn apply_crop(&self) -> EditorResult<Rect> {
        let result = self.active_tree().and_then(|tree| {
            let document = self.active_document();
            self.tools.borrow_mut().apply_crop(document, &tree)
        });
        self.report(result)
    }

    pub fn cancel_crop(&self) {
        self.tools.borrow_mut().cancel_crop();
    }

    pub fn toggle_measure(&self) -> EditorResult<bool> {
        let result = self.tools.borrow_mut().toggle_measure();
        self.report(result)
    }

    /// Measures between two screen points while measure mode is on.
    pub fn measure(&self, start: Pos2, end: Pos2) -> Option<Measurement> {
        let view = self.view.borrow();
        self.tools.borrow_mut().measure(start, end, &view)
    }

    pub fn set_measure_unit(&mut self, unit: MeasureUnit) {
        self.config.measure_unit = unit;
        self.tools.borrow_mut().set_measure_unit(unit);
    }

    /// Returns false when no tool took the press.
    pub fn pointer_down(&self, pos: Pos2) -> bool {
        let view = self.view.borrow();
        self.tools.borrow_mut().pointer_down(pos, &view)
    }

    pub fn pointer_move(&self, pos: Pos2) {
        let view = self.view.borrow();
        self.tools.borrow_mut().pointer_move(pos, &view);
    }

    pub fn pointer_up(&self, pos: Pos2) {
        let view = self.view.borrow();
        self.tools.borrow_mut().pointer_up(pos, &view);
    }

    // Code, optimizer and export

    /// Replaces the active document with the code editor text.
    ///
    /// Text that does not parse leaves the document and the editor as they are.
    pub fn apply_code(&self) -> EditorResult<()> {
        let result = self.require_active().and_then(|id| {
            let text = self.code_view.borrow().text().to_owned();
            self.documents.borrow_mut().update_document_content(id, &text)?;
            self.event_bus.publish(EditorEvent::SnapshotRequested {
                document: Some(id),
                description: "edit SVG code".to_owned(),
                content: text.clone(),
            });
            self.code_view.borrow_mut().mark_applied(&text);
            log::info!("Applied code edits to {}", id);
            self.event_bus.publish(EditorEvent::CodeUpdated { document: id });
            Ok(())
        });
        self.report(result)
    }

    /// Runs the optimizer over the active document and loads the result.
    pub fn optimize_active(&self) -> EditorResult<Optimized> {
        let result = self.require_active().and_then(|id| {
            let content = self
                .documents
                .borrow()
                .get(id)
                .map(|document| document.content().to_owned())
                .ok_or(EditorError::UnknownDocument(id))?;
            let optimized = optimize::optimize(&content, &self.config.optimizer);
            self.documents
                .borrow_mut()
                .update_document_content(id, &optimized.content)?;
            self.event_bus.publish(EditorEvent::SnapshotRequested {
                document: Some(id),
                description: "optimize SVG".to_owned(),
                content: optimized.content.clone(),
            });
            self.event_bus.publish(EditorEvent::OptimizeCompleted {
                document: id,
                original_size: optimized.original_size,
                optimized_size: optimized.optimized_size,
            });
            Ok(optimized)
        });
        self.report(result)
    }

    /// Exports the active document. The document itself is never changed.
    pub fn export_active(&self, exporter: &dyn Exporter, options: &ExportOptions) -> EditorResult<ExportedFile> {
        let result = self.require_active().and_then(|id| self.export_document(exporter, id, options));
        self.report(result)
    }

    /// Exports every open document in order. One failure does not stop the rest.
    pub fn export_all(&self, exporter: &dyn Exporter, options: &ExportOptions) -> Vec<EditorResult<ExportedFile>> {
        let ids: Vec<DocumentId> = self
            .documents
            .borrow()
            .documents()
            .iter()
            .map(|document| document.id())
            .collect();
        log::info!("Batch export of {} documents", ids.len());
        ids.into_iter()
            .map(|id| {
                let result = self.export_document(exporter, id, options);
                self.report(result)
            })
            .collect()
    }

    fn export_document(
        &self,
        exporter: &dyn Exporter,
        id: DocumentId,
        options: &ExportOptions,
    ) -> EditorResult<ExportedFile> {
        let request = {
            let documents = self.documents.borrow();
            let document = documents.get(id).ok_or(EditorError::UnknownDocument(id))?;
            ExportRequest::new(document.content(), document.name(), options)
        };
        self.event_bus.publish(EditorEvent::ExportRequested {
            file_name: request.file_name.clone(),
            format: request.format,
        });
        let exported = run_export(exporter, &request)?;
        self.event_bus.publish(EditorEvent::ExportCompleted {
            file_name: exported.file_name.clone(),
            format: exported.format,
            size: exported.bytes.len(),
        });
        Ok(exported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_are_published() {
        let studio = Studio::default();
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reports);
        studio.event_bus().subscribe(Topic::Error, move |event| {
            if let EditorEvent::Error(report) = event {
                sink.borrow_mut().push(report.title.clone());
            }
        });
        assert!(studio.import_document("bad.svg", "<svg>").is_err());
        assert_eq!(studio.undo(), Err(EditorError::NoActiveDocument));
        assert_eq!(*reports.borrow(), vec!["Invalid SVG", "No document"]);
    }

    #[test]
    fn test_import_records_first_snapshot() {
        let studio = Studio::default();
        let id = studio.import_document("a.svg", "<svg><rect/></svg>").unwrap();
        let history = studio.history();
        assert_eq!(history.len(id), 1);
        assert_eq!(history.entries(id)[0].description, "load file");
        assert!(!history.can_undo(id));
    }
}
