use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::config::ViewConfig;
use crate::event::{EditorEvent, EventBus, EventHandler};
use crate::svg::{self, SvgTree};

/// Used when a document gives neither width/height nor a viewBox.
const DEFAULT_DOCUMENT_SIZE: Vec2 = vec2(300.0, 150.0);

/// Intrinsic size of a document from `width`/`height`, falling back to the viewBox.
pub fn document_size(tree: &SvgTree) -> Vec2 {
    let root = &tree.root;
    let view_box: Vec<f32> = root
        .attr("viewBox")
        .map(|value| {
            value
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|part| !part.is_empty())
                .filter_map(|part| part.parse::<f32>().ok())
                .collect()
        })
        .unwrap_or_default();
    let from_view_box = |index: usize| view_box.get(index).copied().filter(|value| *value > 0.0);
    let length = |name: &str| {
        root.attr(name)
            .and_then(svg::parse_length)
            .map(|value| value as f32)
            .filter(|value| *value > 0.0)
    };
    vec2(
        length("width")
            .or_else(|| from_view_box(2))
            .unwrap_or(DEFAULT_DOCUMENT_SIZE.x),
        length("height")
            .or_else(|| from_view_box(3))
            .unwrap_or(DEFAULT_DOCUMENT_SIZE.y),
    )
}

/// Zoom and pan of the canvas. Screen positions are relative to the
/// canvas origin; document positions are in SVG user units.
#[derive(Debug)]
pub struct ViewState {
    scale: f32,
    translation: Vec2,
    document_size: Option<Vec2>,
    /// Last known canvas size, used to fit newly selected documents.
    container: Option<Vec2>,
    enabled: bool,
    config: ViewConfig,
    event_bus: EventBus,
}

impl ViewState {
    pub fn new(event_bus: EventBus, config: ViewConfig) -> Self {
        Self {
            scale: 1.0,
            translation: Vec2::ZERO,
            document_size: None,
            container: None,
            enabled: true,
            config,
            event_bus,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    pub fn document_size(&self) -> Option<Vec2> {
        self.document_size
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn container(&self) -> Option<Vec2> {
        self.container
    }

    pub fn set_container(&mut self, size: Vec2) {
        self.container = Some(size);
    }

    /// Scales by `factor` keeping the document point under `point` in place.
    pub fn zoom_at_point(&mut self, factor: f32, point: Pos2) {
        if !self.enabled {
            return;
        }
        let world = (point.to_vec2() - self.translation) / self.scale;
        let scale = (self.scale * factor).clamp(self.config.min_zoom, self.config.max_zoom);
        self.scale = scale;
        self.translation = point.to_vec2() - world * scale;
        self.event_bus.publish(EditorEvent::ViewZoomed { scale });
    }

    pub fn zoom_in(&mut self, container: Vec2) {
        self.zoom_at_point(self.config.zoom_in_factor, (container / 2.0).to_pos2());
    }

    pub fn zoom_out(&mut self, container: Vec2) {
        self.zoom_at_point(self.config.zoom_out_factor, (container / 2.0).to_pos2());
    }

    pub fn pan(&mut self, delta: Vec2) {
        if !self.enabled || delta == Vec2::ZERO {
            return;
        }
        self.translation += delta;
        self.event_bus.publish(EditorEvent::ViewPanned {
            translation: self.translation,
        });
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.translation = Vec2::ZERO;
        self.event_bus.publish(EditorEvent::ViewReset);
    }

    /// Scales the document to fill most of `container` and centers it.
    /// Does nothing without a document.
    pub fn fit(&mut self, container: Vec2) {
        let Some(size) = self.document_size else {
            return;
        };
        if container.x <= 0.0 || container.y <= 0.0 {
            return;
        }
        let scale = (container.x / size.x).min(container.y / size.y) * self.config.fit_margin;
        self.scale = scale;
        self.translation = (container - size * scale) / 2.0;
        log::debug!("Fit view at {:.0}%", scale * 100.0);
        self.event_bus.publish(EditorEvent::ViewFit {
            scale,
            translation: self.translation,
        });
    }

    pub fn screen_to_document(&self, point: Pos2) -> Pos2 {
        ((point.to_vec2() - self.translation) / self.scale).to_pos2()
    }

    pub fn document_to_screen(&self, point: Pos2) -> Pos2 {
        (point.to_vec2() * self.scale + self.translation).to_pos2()
    }

    pub fn screen_rect_to_document(&self, rect: Rect) -> Rect {
        Rect::from_two_pos(self.screen_to_document(rect.min), self.screen_to_document(rect.max))
    }

    /// Screen rectangle covered by the document, if one is open.
    pub fn document_rect(&self) -> Option<Rect> {
        let size = self.document_size?;
        Some(Rect::from_min_max(
            self.document_to_screen(Pos2::ZERO),
            self.document_to_screen(pos2(size.x, size.y)),
        ))
    }
}

impl EventHandler for ViewState {
    fn handle_event(&mut self, event: &EditorEvent) {
        match event {
            EditorEvent::DocumentLoaded(info) => {
                if let Ok(tree) = info.tree.try_borrow() {
                    self.document_size = Some(document_size(&tree));
                }
            }
            EditorEvent::DocumentSelected(Some(info)) => {
                if let Ok(tree) = info.tree.try_borrow() {
                    self.document_size = Some(document_size(&tree));
                }
                if let Some(container) = self.container {
                    self.fit(container);
                }
            }
            EditorEvent::DocumentSelected(None) => self.document_size = None,
            EditorEvent::CropStarted => self.enabled = false,
            EditorEvent::CropCompleted { region } => {
                self.document_size = Some(region.size());
                self.enabled = true;
            }
            EditorEvent::CropCancelled => self.enabled = true,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewState {
        ViewState::new(EventBus::new(), ViewConfig::default())
    }

    #[test]
    fn test_document_size_fallbacks() {
        let size = |text: &str| document_size(&svg::parse(text).unwrap());
        assert_eq!(size(r#"<svg width="200px" height="100"/>"#), vec2(200.0, 100.0));
        assert_eq!(size(r#"<svg viewBox="0 0 64 32"/>"#), vec2(64.0, 32.0));
        assert_eq!(size(r#"<svg width="auto"/>"#), DEFAULT_DOCUMENT_SIZE);
    }

    #[test]
    fn test_zoom_keeps_point_fixed_and_clamps() {
        let mut view = view();
        let anchor = pos2(50.0, 40.0);
        let before = view.screen_to_document(anchor);
        view.zoom_at_point(2.0, anchor);
        let after = view.screen_to_document(anchor);
        assert!((before - after).length() < 1e-4);

        view.zoom_at_point(1000.0, anchor);
        assert_eq!(view.scale(), 10.0);
        view.zoom_at_point(0.0001, anchor);
        assert!((view.scale() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_fit_centers_document() {
        let mut view = view();
        view.document_size = Some(vec2(100.0, 50.0));
        view.fit(vec2(400.0, 400.0));
        assert!((view.scale() - 3.6).abs() < 1e-4);
        assert!((view.translation().x - 20.0).abs() < 1e-3);
        assert!((view.translation().y - 110.0).abs() < 1e-3);
    }

    #[test]
    fn test_disabled_view_ignores_zoom() {
        let mut view = view();
        view.set_enabled(false);
        view.zoom_in(vec2(100.0, 100.0));
        assert_eq!(view.scale(), 1.0);
    }
}
