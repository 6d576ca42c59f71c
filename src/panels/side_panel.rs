use crate::app::{SideTab, StudioApp};
use crate::property::{TEXT_CONTENT, clamp_opacity, parse_hex_color, to_hex_color};
use crate::selection::{ElementInfo, NodeRef};
use crate::util::time::format_clock;

pub fn side_panel(app: &mut StudioApp, ctx: &egui::Context) {
    egui::SidePanel::right("side_panel")
        .resizable(true)
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (tab, label) in [
                    (SideTab::Properties, "Properties"),
                    (SideTab::History, "History"),
                    (SideTab::Code, "Code"),
                ] {
                    if ui.selectable_label(app.side_tab() == tab, label).clicked() {
                        app.set_side_tab(tab);
                    }
                }
            });
            ui.separator();
            match app.side_tab() {
                SideTab::Properties => properties_tab(app, ui),
                SideTab::History => history_tab(app, ui),
                SideTab::Code => code_tab(app, ui),
            }
        });
}

fn properties_tab(app: &StudioApp, ui: &mut egui::Ui) {
    let studio = app.studio();
    let (node, info) = {
        let selection = studio.selection();
        (selection.selected().cloned(), selection.info().cloned())
    };
    let (Some(node), Some(info)) = (node, info) else {
        ui.weak("Select an element to edit its properties");
        return;
    };

    ui.heading(info.label());
    egui::Grid::new("style_grid").num_columns(2).striped(true).show(ui, |ui| {
        color_row(app, ui, &node, "fill", &info.fill);
        opacity_row(app, ui, &node, "fill-opacity", &info.fill_opacity);
        color_row(app, ui, &node, "stroke", &info.stroke);
        text_row(app, ui, &node, "stroke-width", &info.stroke_width);
        opacity_row(app, ui, &node, "stroke-opacity", &info.stroke_opacity);
        text_row(app, ui, &node, "transform", &info.transform);
    });

    ui.separator();
    geometry_grid(app, ui, &node, &info);
}

fn geometry_grid(app: &StudioApp, ui: &mut egui::Ui, node: &NodeRef, info: &ElementInfo) {
    let fields = info.geometry_fields();
    if fields.is_empty() {
        return;
    }
    egui::Grid::new("geometry_grid").num_columns(2).striped(true).show(ui, |ui| {
        for (name, value) in fields {
            text_row(app, ui, node, name, value);
        }
    });
}

/// A text field that writes its attribute when editing finishes.
fn text_row(app: &StudioApp, ui: &mut egui::Ui, node: &NodeRef, name: &str, value: &str) {
    ui.label(name);
    let id = ui.make_persistent_id((name, node.path().to_string()));
    let mut text = ui
        .data_mut(|data| data.get_temp::<String>(id))
        .unwrap_or_else(|| value.to_owned());
    let response = ui.text_edit_singleline(&mut text);
    if response.has_focus() {
        ui.data_mut(|data| data.insert_temp(id, text.clone()));
    } else {
        ui.data_mut(|data| data.remove::<String>(id));
    }
    if response.lost_focus() && text != value {
        let studio = app.studio();
        let _ = if name == TEXT_CONTENT {
            studio.set_text(node, &text)
        } else {
            studio.set_attribute(node, name, &text)
        };
    }
    ui.end_row();
}

fn color_row(app: &StudioApp, ui: &mut egui::Ui, node: &NodeRef, name: &str, value: &str) {
    ui.label(name);
    ui.horizontal(|ui| {
        match parse_hex_color(value) {
            Some(mut color) => {
                let response = ui.color_edit_button_srgba(&mut color);
                if response.changed() {
                    let _ = app.studio().set_attribute(node, name, &to_hex_color(color));
                }
            }
            None => {
                ui.weak(value);
            }
        }
        if value != "none" && ui.small_button("none").clicked() {
            let _ = app.studio().set_attribute(node, name, "none");
        }
    });
    ui.end_row();
}

fn opacity_row(app: &StudioApp, ui: &mut egui::Ui, node: &NodeRef, name: &str, value: &str) {
    ui.label(name);
    let mut opacity = value.trim().parse::<f64>().unwrap_or(1.0);
    let response = ui.add(egui::Slider::new(&mut opacity, 0.0..=1.0));
    if response.drag_stopped() || (response.changed() && !response.dragged()) {
        let _ = app.studio().set_attribute(node, name, &clamp_opacity(opacity));
    }
    ui.end_row();
}

fn history_tab(app: &StudioApp, ui: &mut egui::Ui) {
    let studio = app.studio();
    let Some(id) = studio.active_document() else {
        ui.weak("No document");
        return;
    };
    let status = studio.history_status();
    ui.horizontal(|ui| {
        if ui.add_enabled(status.can_undo, egui::Button::new("Undo")).clicked() {
            let _ = studio.undo();
        }
        if ui.add_enabled(status.can_redo, egui::Button::new("Redo")).clicked() {
            let _ = studio.redo();
        }
        ui.label(format!("{} entries", status.len));
    });
    ui.separator();

    let entries: Vec<(String, u64)> = studio
        .history()
        .entries(id)
        .iter()
        .map(|snapshot| (snapshot.description.clone(), snapshot.timestamp))
        .collect();
    egui::ScrollArea::vertical().show(ui, |ui| {
        for (index, (description, timestamp)) in entries.iter().enumerate().rev() {
            let current = status.cursor == Some(index);
            let text = format!("{}  {}", format_clock(*timestamp), description);
            let text = if status.cursor.is_some_and(|cursor| index > cursor) {
                egui::RichText::new(text).weak()
            } else {
                egui::RichText::new(text)
            };
            ui.selectable_label(current, text);
        }
    });
}

fn code_tab(app: &StudioApp, ui: &mut egui::Ui) {
    let studio = app.studio();
    if studio.active_document().is_none() {
        ui.weak("No document");
        return;
    }
    let modified = studio.code_view().is_modified();
    ui.horizontal(|ui| {
        if ui.add_enabled(modified, egui::Button::new("Apply")).clicked() {
            let _ = studio.apply_code();
        }
        if ui.add_enabled(modified, egui::Button::new("Revert")).clicked() {
            studio.code_view_mut().revert();
        }
        if modified {
            ui.label("modified");
        }
    });
    ui.separator();
    egui::ScrollArea::both().show(ui, |ui| {
        let mut code_view = studio.code_view_mut();
        ui.add(
            egui::TextEdit::multiline(code_view.text_mut())
                .code_editor()
                .desired_width(f32::INFINITY)
                .desired_rows(30),
        );
    });
}
