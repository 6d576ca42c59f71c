use crate::StudioApp;
use crate::layer::Layer;

pub fn layers_panel(app: &mut StudioApp, ctx: &egui::Context) {
    egui::SidePanel::left("layers_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Layers");
            ui.separator();

            let layers: Vec<Layer> = app.studio().layers().layers().to_vec();
            if layers.is_empty() {
                ui.weak("No layers");
                return;
            }
            let highlighted = app.studio().highlighted_layer();

            egui::ScrollArea::vertical().show(ui, |ui| {
                for layer in &layers {
                    ui.horizontal(|ui| layer_row(app, ui, layer, highlighted.as_ref() == Some(&layer.id)));
                }
            });
        });
}

fn layer_row(app: &mut StudioApp, ui: &mut egui::Ui, layer: &Layer, highlighted: bool) {
    let mut visible = layer.visible;
    if ui.checkbox(&mut visible, "").on_hover_text("Visible").changed() {
        let _ = app.studio().set_layer_visibility(&layer.id, visible);
    }

    let editing = app
        .renaming_mut()
        .as_ref()
        .is_some_and(|(id, _)| id == &layer.id);
    if editing {
        let mut commit = None;
        let mut cancel = false;
        if let Some((_, name)) = app.renaming_mut() {
            let response = ui.text_edit_singleline(name);
            if response.lost_focus() {
                if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    commit = Some(name.clone());
                } else {
                    cancel = true;
                }
            }
            response.request_focus();
        }
        if let Some(name) = commit {
            *app.renaming_mut() = None;
            let _ = app.studio().rename_layer(&layer.id, &name);
        } else if cancel {
            *app.renaming_mut() = None;
        }
        return;
    }

    let label = if layer.visible {
        egui::RichText::new(&layer.name)
    } else {
        egui::RichText::new(&layer.name).weak()
    };
    if ui
        .selectable_label(highlighted, label)
        .on_hover_text(format!("<{}>", layer.tag))
        .clicked()
    {
        let _ = app.studio().select_layer(&layer.id);
    }
    if ui.small_button("Rename").clicked() {
        *app.renaming_mut() = Some((layer.id.clone(), layer.name.clone()));
    }
    if ui.small_button("Delete").clicked() {
        let _ = app.studio().delete_layer(&layer.id);
    }
}
