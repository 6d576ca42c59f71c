use eframe::egui::{Pos2, Rect};

use super::{CanvasTool, InteractiveMode};
use crate::error::{EditorError, EditorResult};
use crate::event::EditorEvent;
use crate::svg::{self, SvgTree};
use crate::view::ViewState;

/// Drag-to-select crop region.
#[derive(Debug, Default)]
pub struct CropTool {
    /// Screen positions of the drag in progress.
    drag: Option<(Pos2, Pos2)>,
    /// Finished region in document coordinates.
    region: Option<Rect>,
}

impl CropTool {
    pub fn begin_drag(&mut self, pos: Pos2) {
        self.drag = Some((pos, pos));
    }

    pub fn drag_to(&mut self, pos: Pos2) {
        if let Some((_, end)) = &mut self.drag {
            *end = pos;
        }
    }

    /// Finishes the drag and converts it to document coordinates.
    pub fn end_drag(&mut self, pos: Pos2, view: &ViewState) -> Option<Rect> {
        let (start, _) = self.drag.take()?;
        let region = view.screen_rect_to_document(Rect::from_two_pos(start, pos));
        self.region = Some(region);
        Some(region)
    }

    /// Sets the region directly, in document coordinates.
    pub fn set_region(&mut self, region: Rect) {
        self.drag = None;
        self.region = Some(region);
    }

    pub fn region(&self) -> Option<Rect> {
        self.region
    }

    /// Screen rectangle of the drag in progress, for drawing.
    pub fn drag_rect(&self) -> Option<Rect> {
        self.drag.map(|(start, end)| Rect::from_two_pos(start, end))
    }
}

impl CanvasTool for CropTool {
    fn mode(&self) -> InteractiveMode {
        InteractiveMode::Crop
    }

    fn on_pointer_down(&mut self, pos: Pos2, _view: &ViewState) {
        self.begin_drag(pos);
    }

    fn on_pointer_move(&mut self, pos: Pos2, _view: &ViewState) {
        self.drag_to(pos);
    }

    fn on_pointer_up(&mut self, pos: Pos2, view: &ViewState) -> Option<EditorEvent> {
        self.end_drag(pos, view);
        None
    }

    fn reset(&mut self) {
        self.drag = None;
        self.region = None;
    }
}

/// Points the root's viewport at `region` and sizes it to match.
pub fn crop_tree(tree: &mut SvgTree, region: Rect) -> EditorResult<()> {
    if !(region.width() > 0.0 && region.height() > 0.0) {
        return Err(EditorError::NothingToCrop);
    }
    let number = |value: f32| svg::format_number(f64::from(value));
    let root = &mut tree.root;
    root.set_attr("width", &number(region.width()));
    root.set_attr("height", &number(region.height()));
    root.set_attr(
        "viewBox",
        &format!(
            "{} {} {} {}",
            number(region.min.x),
            number(region.min.y),
            number(region.width()),
            number(region.height())
        ),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::event::EventBus;
    use eframe::egui::pos2;

    #[test]
    fn test_crop_sets_viewport() {
        let mut tree = svg::parse(r#"<svg width="100" height="100"><rect/></svg>"#).unwrap();
        crop_tree(&mut tree, Rect::from_min_max(pos2(10.0, 20.0), pos2(40.0, 70.5))).unwrap();
        assert_eq!(tree.root.attr("width"), Some("30"));
        assert_eq!(tree.root.attr("height"), Some("50.5"));
        assert_eq!(tree.root.attr("viewBox"), Some("10 20 30 50.5"));
    }

    #[test]
    fn test_empty_region_is_rejected() {
        let mut tree = svg::parse("<svg/>").unwrap();
        let empty = Rect::from_min_max(pos2(5.0, 5.0), pos2(5.0, 9.0));
        assert_eq!(crop_tree(&mut tree, empty), Err(EditorError::NothingToCrop));
    }

    #[test]
    fn test_drag_converts_through_view() {
        let mut view = ViewState::new(EventBus::new(), ViewConfig::default());
        view.zoom_at_point(2.0, pos2(0.0, 0.0));
        let mut tool = CropTool::default();
        tool.on_pointer_down(pos2(40.0, 20.0), &view);
        tool.on_pointer_move(pos2(10.0, 60.0), &view);
        assert!(tool.drag_rect().is_some());
        tool.on_pointer_up(pos2(10.0, 60.0), &view);
        assert_eq!(
            tool.region(),
            Some(Rect::from_min_max(pos2(5.0, 10.0), pos2(20.0, 30.0)))
        );
    }
}
