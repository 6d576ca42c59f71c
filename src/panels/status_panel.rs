use crate::StudioApp;
use crate::tools::MeasureUnit;

pub fn status_bar(app: &mut StudioApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let status = app.notices().borrow().status.clone();
            ui.label(status);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut unit = app.studio().tools().measure_tool().unit();
                egui::ComboBox::from_id_salt("measure_unit")
                    .selected_text(unit.label())
                    .show_ui(ui, |ui| {
                        for option in MeasureUnit::ALL {
                            ui.selectable_value(&mut unit, option, option.label());
                        }
                    });
                if unit != app.studio().tools().measure_tool().unit() {
                    app.studio_mut().set_measure_unit(unit);
                }

                let size = app.studio().view().document_size();
                if let Some(size) = size {
                    ui.label(format!("{:.0} x {:.0}", size.x, size.y));
                }
            });
        });
    });
}

pub fn error_window(app: &mut StudioApp, ctx: &egui::Context) {
    let errors = app.notices().borrow().errors.clone();
    let Some(latest) = errors.last() else {
        return;
    };
    let mut dismissed = false;
    egui::Window::new(&latest.title)
        .id(egui::Id::new("error_window"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 40.0))
        .show(ctx, |ui| {
            ui.label(&latest.message);
            if errors.len() > 1 {
                ui.weak(format!("{} more", errors.len() - 1));
            }
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
    if dismissed {
        app.notices().borrow_mut().errors.clear();
    }
}
