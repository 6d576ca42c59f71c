use crate::StudioApp;
use crate::document::DocumentId;
use crate::export::{ExportedFile, SvgExporter};
use crate::tools::InteractiveMode;

const BLANK_DOCUMENT: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300" viewBox="0 0 400 300"></svg>"#;

pub fn files_panel(app: &mut StudioApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("files_panel").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            if ui.button("New").clicked() {
                app.open("untitled.svg", BLANK_DOCUMENT);
            }
            ui.separator();
            document_tabs(app, ui);
        });
        ui.horizontal_wrapped(|ui| {
            history_buttons(app, ui);
            ui.separator();
            view_buttons(app, ui);
            ui.separator();
            tool_buttons(app, ui);
            ui.separator();
            output_buttons(app, ui);
        });
    });
}

fn document_tabs(app: &StudioApp, ui: &mut egui::Ui) {
    let studio = app.studio();
    let active = studio.active_document();
    let tabs: Vec<(DocumentId, String)> = studio
        .documents()
        .documents()
        .iter()
        .map(|document| (document.id(), document.name().to_owned()))
        .collect();
    if tabs.is_empty() {
        ui.weak("Drop SVG files here to open them");
        return;
    }
    for (id, name) in tabs {
        if ui.selectable_label(active == Some(id), &name).clicked() && active != Some(id) {
            let _ = studio.select_document(id);
        }
        if ui.small_button("x").on_hover_text("Close").clicked() {
            let _ = studio.close_document(id);
        }
    }
}

fn history_buttons(app: &StudioApp, ui: &mut egui::Ui) {
    let studio = app.studio();
    let status = studio.history_status();
    if ui.add_enabled(status.can_undo, egui::Button::new("Undo")).clicked() {
        let _ = studio.undo();
    }
    if ui.add_enabled(status.can_redo, egui::Button::new("Redo")).clicked() {
        let _ = studio.redo();
    }
}

fn view_buttons(app: &StudioApp, ui: &mut egui::Ui) {
    let studio = app.studio();
    let (zoom, enabled) = {
        let view = studio.view();
        (view.zoom_percent(), view.is_enabled())
    };
    ui.add_enabled_ui(enabled, |ui| {
        if ui.button("-").on_hover_text("Zoom out").clicked() {
            studio.zoom_out();
        }
        ui.label(format!("{}%", zoom));
        if ui.button("+").on_hover_text("Zoom in").clicked() {
            studio.zoom_in();
        }
        if ui.button("Fit").clicked() {
            studio.fit_view();
        }
        if ui.button("1:1").on_hover_text("Reset view").clicked() {
            studio.reset_view();
        }
    });
}

fn tool_buttons(app: &StudioApp, ui: &mut egui::Ui) {
    let studio = app.studio();
    let (active, has_region) = {
        let tools = studio.tools();
        (tools.active_mode(), tools.crop().region().is_some())
    };
    if active == Some(InteractiveMode::Crop) {
        if ui.add_enabled(has_region, egui::Button::new("Apply crop")).clicked() {
            let _ = studio.apply_crop();
        }
        if ui.button("Cancel crop").clicked() {
            studio.cancel_crop();
        }
    } else if ui.button("Crop").clicked() {
        let _ = studio.start_crop();
    }
    let measuring = active == Some(InteractiveMode::Measure);
    if ui.selectable_label(measuring, "Measure").clicked() {
        let _ = studio.toggle_measure();
    }
}

fn output_buttons(app: &StudioApp, ui: &mut egui::Ui) {
    let studio = app.studio();
    let has_document = studio.active_document().is_some();
    ui.add_enabled_ui(has_document, |ui| {
        if ui.button("Optimize").clicked() {
            let _ = studio.optimize_active();
        }
        let options = studio.config().export.clone();
        if ui.button("Export").clicked() {
            if let Ok(file) = studio.export_active(&SvgExporter, &options) {
                save_export(&file);
            }
        }
        if ui.button("Export all").clicked() {
            for file in studio.export_all(&SvgExporter, &options).into_iter().flatten() {
                save_export(&file);
            }
        }
    });
}

/// Writes an export next to the working directory.
#[cfg(not(target_arch = "wasm32"))]
fn save_export(file: &ExportedFile) {
    match std::fs::write(&file.file_name, &file.bytes) {
        Ok(()) => log::info!("Saved {}", file.file_name),
        Err(err) => log::error!("Failed to save {}: {}", file.file_name, err),
    }
}

#[cfg(target_arch = "wasm32")]
fn save_export(file: &ExportedFile) {
    log::warn!("Saving {} is not available in the browser build", file.file_name);
}
