use std::cell::RefCell;
use std::rc::Rc;

use crate::config::StudioConfig;
use crate::error::ErrorReport;
use crate::event::{EditorEvent, Subscription, Topic};
use crate::file_handler::FileHandler;
use crate::layer::LayerId;
use crate::panels;
use crate::studio::Studio;

/// Right-hand panel contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideTab {
    Properties,
    History,
    Code,
}

/// Messages collected from the bus for display.
#[derive(Debug, Default)]
pub struct Notices {
    pub errors: Vec<ErrorReport>,
    pub status: String,
}

pub struct StudioApp {
    studio: Studio,
    file_handler: FileHandler,
    notices: Rc<RefCell<Notices>>,
    side_tab: SideTab,
    /// Layer being renamed and the name typed so far.
    renaming: Option<(LayerId, String)>,
    _subscriptions: Vec<Subscription>,
}

impl Default for StudioApp {
    fn default() -> Self {
        Self::with_config(StudioConfig::default())
    }
}

impl StudioApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = cc
            .storage
            .and_then(|storage| eframe::get_value::<StudioConfig>(storage, eframe::APP_KEY))
            .filter(|config| match config.validate() {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Ignoring stored settings: {}", err);
                    false
                }
            })
            .unwrap_or_default();
        Self::with_config(config)
    }

    pub fn with_config(config: StudioConfig) -> Self {
        let studio = Studio::new(config);
        let notices = Rc::new(RefCell::new(Notices::default()));
        let subscriptions = watch_notices(&studio, &notices);
        Self {
            studio,
            file_handler: FileHandler::new(),
            notices,
            side_tab: SideTab::Properties,
            renaming: None,
            _subscriptions: subscriptions,
        }
    }

    pub fn studio(&self) -> &Studio {
        &self.studio
    }

    pub fn studio_mut(&mut self) -> &mut Studio {
        &mut self.studio
    }

    pub fn notices(&self) -> &Rc<RefCell<Notices>> {
        &self.notices
    }

    pub fn side_tab(&self) -> SideTab {
        self.side_tab
    }

    pub fn set_side_tab(&mut self, tab: SideTab) {
        self.side_tab = tab;
    }

    pub fn renaming_mut(&mut self) -> &mut Option<(LayerId, String)> {
        &mut self.renaming
    }

    /// Opens SVG text, reporting problems through the error notices.
    pub fn open(&self, name: &str, text: &str) {
        // Failures are already published as error events.
        let _ = self.studio.import_document(name, text);
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        self.file_handler.preview_files_being_dropped(ctx);
        if self.file_handler.check_for_dropped_files(ctx) {
            for file in self.file_handler.take_svg_files() {
                self.open(&file.name, &file.text);
            }
        }
    }

    fn handle_shortcuts(&self, ctx: &egui::Context) {
        // Text fields keep their own undo and escape handling.
        if ctx.wants_keyboard_input() {
            return;
        }
        let (undo, redo, escape) = ctx.input_mut(|i| {
            let redo = i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z)
                || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y);
            let undo = i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z);
            let escape = i.consume_key(egui::Modifiers::NONE, egui::Key::Escape);
            (undo, redo, escape)
        });
        if undo {
            let _ = self.studio.undo();
        }
        if redo {
            let _ = self.studio.redo();
        }
        if escape {
            self.studio.cancel_crop();
            self.studio.deselect();
        }
    }
}

/// Keeps the last error reports and a one-line status from bus events.
fn watch_notices(studio: &Studio, notices: &Rc<RefCell<Notices>>) -> Vec<Subscription> {
    let topics = [
        Topic::Error,
        Topic::HistoryUndo,
        Topic::HistoryRedo,
        Topic::CropCompleted,
        Topic::MeasureCompleted,
        Topic::OptimizeCompleted,
        Topic::ExportCompleted,
        Topic::CodeUpdated,
    ];
    topics
        .iter()
        .map(|&topic| {
            let notices = Rc::downgrade(notices);
            studio.event_bus().subscribe(topic, move |event| {
                let Some(notices) = notices.upgrade() else {
                    return;
                };
                let mut notices = notices.borrow_mut();
                match event {
                    EditorEvent::Error(report) => {
                        notices.status = format!("{}: {}", report.title, report.message);
                        notices.errors.push(report.clone());
                    }
                    EditorEvent::UndoApplied { snapshot, .. } => {
                        notices.status = format!("Undo: {}", snapshot.description);
                    }
                    EditorEvent::RedoApplied { snapshot, .. } => {
                        notices.status = format!("Redo: {}", snapshot.description);
                    }
                    EditorEvent::CropCompleted { region } => {
                        notices.status = format!("Cropped to {:.0} x {:.0}", region.width(), region.height());
                    }
                    EditorEvent::MeasureCompleted(measurement) => notices.status = measurement.summary(),
                    EditorEvent::OptimizeCompleted {
                        original_size,
                        optimized_size,
                        ..
                    } => {
                        notices.status = format!("Optimized {} -> {} bytes", original_size, optimized_size);
                    }
                    EditorEvent::ExportCompleted { file_name, size, .. } => {
                        notices.status = format!("Exported {} ({} bytes)", file_name, size);
                    }
                    EditorEvent::CodeUpdated { .. } => notices.status = "Code applied".to_owned(),
                    _ => {}
                }
            })
        })
        .collect()
}

impl eframe::App for StudioApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self.studio.config());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.handle_shortcuts(ctx);

        panels::files_panel(self, ctx);
        panels::status_bar(self, ctx);
        panels::layers_panel(self, ctx);
        panels::side_panel(self, ctx);
        panels::canvas_panel(self, ctx);
        panels::error_window(self, ctx);
    }
}
