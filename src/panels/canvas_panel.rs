use egui::{Color32, Pos2, Rect, Sense, Stroke, Vec2, pos2, vec2};

use crate::StudioApp;
use crate::selection::Geometry;
use crate::svg;
use crate::tools::InteractiveMode;
use crate::view::ViewState;

const SELECTION_COLOR: Color32 = Color32::from_rgb(0, 120, 215);
const CROP_COLOR: Color32 = Color32::from_rgb(255, 170, 0);
const MEASURE_COLOR: Color32 = Color32::from_rgb(220, 40, 40);

pub fn canvas_panel(app: &mut StudioApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let canvas = response.rect;
        let studio = app.studio();

        if studio.view().container() != Some(canvas.size()) {
            studio.set_canvas_size(canvas.size());
        }
        let local = |pos: Pos2| (pos - canvas.min).to_pos2();

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                if let Some(pointer) = response.hover_pos() {
                    let view = &studio.config().view;
                    let factor = if scroll > 0.0 {
                        view.zoom_in_factor
                    } else {
                        view.zoom_out_factor
                    };
                    studio.zoom_at(factor, local(pointer));
                }
            }
        }

        let tool_active = studio.tools().active_mode().is_some();
        if let Some(pointer) = response.interact_pointer_pos() {
            let pos = local(pointer);
            if response.drag_started() {
                studio.pointer_down(pos);
            } else if response.dragged() {
                if tool_active {
                    studio.pointer_move(pos);
                } else {
                    studio.pan(response.drag_delta());
                }
            }
            if response.drag_stopped() {
                studio.pointer_up(pos);
            }
        }
        if response.clicked() && !tool_active {
            studio.deselect();
        }

        painter.rect_filled(canvas, 0.0, ui.visuals().extreme_bg_color);
        let view = studio.view();
        let to_screen = |pos: Pos2| view.document_to_screen(pos) + canvas.min.to_vec2();

        match view.document_rect() {
            Some(page) => {
                let page = page.translate(canvas.min.to_vec2());
                painter.rect_filled(page, 0.0, Color32::WHITE);
                painter.rect_stroke(page, 0.0, Stroke::new(1.0, Color32::GRAY));
            }
            None => {
                painter.text(
                    canvas.center(),
                    egui::Align2::CENTER_CENTER,
                    "Drop an SVG file to start",
                    egui::FontId::proportional(18.0),
                    ui.visuals().weak_text_color(),
                );
                return;
            }
        }

        if let Some(info) = studio.selection().info() {
            draw_outline(&painter, &view, canvas, &info.geometry);
        }

        let tools = studio.tools();
        match tools.active_mode() {
            Some(InteractiveMode::Crop) => {
                let region = tools
                    .crop()
                    .drag_rect()
                    .map(|rect| rect.translate(canvas.min.to_vec2()))
                    .or_else(|| {
                        tools
                            .crop()
                            .region()
                            .map(|region| Rect::from_two_pos(to_screen(region.min), to_screen(region.max)))
                    });
                if let Some(region) = region {
                    painter.rect_filled(region, 0.0, CROP_COLOR.gamma_multiply(0.15));
                    painter.rect_stroke(region, 0.0, Stroke::new(1.5, CROP_COLOR));
                }
            }
            Some(InteractiveMode::Measure) => {
                let measure = tools.measure_tool();
                if let Some((start, end)) = measure.drag_line() {
                    painter.line_segment(
                        [start + canvas.min.to_vec2(), end + canvas.min.to_vec2()],
                        Stroke::new(1.5, MEASURE_COLOR),
                    );
                } else if let Some(last) = measure.last() {
                    let (start, end) = (to_screen(last.start), to_screen(last.end));
                    painter.line_segment([start, end], Stroke::new(1.5, MEASURE_COLOR));
                    painter.text(
                        end + vec2(8.0, -8.0),
                        egui::Align2::LEFT_BOTTOM,
                        last.summary(),
                        egui::FontId::monospace(12.0),
                        MEASURE_COLOR,
                    );
                }
            }
            None => {}
        }
    });
}

fn number(value: &str) -> f32 {
    svg::parse_length(value).unwrap_or(0.0) as f32
}

/// Outlines simple shapes of the selected element.
fn draw_outline(painter: &egui::Painter, view: &ViewState, canvas: Rect, geometry: &Geometry) {
    let offset = canvas.min.to_vec2();
    let to_screen = |x: f32, y: f32| view.document_to_screen(pos2(x, y)) + offset;
    let stroke = Stroke::new(1.5, SELECTION_COLOR);
    match geometry {
        Geometry::Rect {
            x, y, width, height, ..
        } => {
            let min = to_screen(number(x), number(y));
            let max = to_screen(number(x) + number(width), number(y) + number(height));
            painter.rect_stroke(Rect::from_min_max(min, max), 0.0, stroke);
        }
        Geometry::Circle { cx, cy, r } => {
            let center = to_screen(number(cx), number(cy));
            painter.circle_stroke(center, number(r) * view.scale(), stroke);
        }
        Geometry::Ellipse { cx, cy, rx, ry } => {
            let radius = vec2(number(rx), number(ry));
            let min = to_screen(number(cx) - radius.x, number(cy) - radius.y);
            let max = to_screen(number(cx) + radius.x, number(cy) + radius.y);
            painter.rect_stroke(Rect::from_min_max(min, max), 0.0, stroke);
        }
        Geometry::Line { x1, y1, x2, y2 } => {
            painter.line_segment(
                [to_screen(number(x1), number(y1)), to_screen(number(x2), number(y2))],
                stroke,
            );
        }
        Geometry::Points { points } => {
            let coords: Vec<f32> = points
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter_map(|part| part.parse().ok())
                .collect();
            let line: Vec<Pos2> = coords
                .chunks_exact(2)
                .map(|pair| to_screen(pair[0], pair[1]))
                .collect();
            if line.len() > 1 {
                painter.add(egui::Shape::line(line, stroke));
            }
        }
        Geometry::Text { x, y, .. } => {
            let anchor = to_screen(number(x), number(y));
            painter.line_segment([anchor, anchor + Vec2::X * 24.0], stroke);
        }
        Geometry::Path { .. } | Geometry::None => {}
    }
}
