use eframe::egui::Pos2;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CanvasTool, InteractiveMode};
use crate::event::EditorEvent;
use crate::view::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureUnit {
    #[default]
    Px,
    Mm,
    Cm,
    In,
}

impl MeasureUnit {
    pub const ALL: [MeasureUnit; 4] = [MeasureUnit::Px, MeasureUnit::Mm, MeasureUnit::Cm, MeasureUnit::In];

    /// User units (CSS pixels) per unit.
    pub fn pixels_per_unit(self) -> f32 {
        match self {
            MeasureUnit::Px => 1.0,
            MeasureUnit::Mm => 3.779_527_6,
            MeasureUnit::Cm => 37.795_276,
            MeasureUnit::In => 96.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeasureUnit::Px => "px",
            MeasureUnit::Mm => "mm",
            MeasureUnit::Cm => "cm",
            MeasureUnit::In => "in",
        }
    }
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Distance between two document points, converted to `unit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Document coordinates.
    pub start: Pos2,
    pub end: Pos2,
    /// Absolute horizontal and vertical distance.
    pub dx: f32,
    pub dy: f32,
    pub length: f32,
    /// Direction from start to end, degrees in `(-180, 180]`, y pointing down.
    pub angle: f32,
    pub unit: MeasureUnit,
}

impl Measurement {
    pub fn between(start: Pos2, end: Pos2, unit: MeasureUnit) -> Self {
        let delta = end - start;
        let factor = unit.pixels_per_unit();
        Self {
            start,
            end,
            dx: delta.x.abs() / factor,
            dy: delta.y.abs() / factor,
            length: delta.length() / factor,
            angle: delta.y.atan2(delta.x).to_degrees(),
            unit,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{:.2} {unit} (dx {:.2} {unit}, dy {:.2} {unit}, {:.1}°)",
            self.length,
            self.dx,
            self.dy,
            self.angle,
            unit = self.unit
        )
    }
}

#[derive(Debug, Default)]
pub struct MeasureTool {
    unit: MeasureUnit,
    /// Screen positions of the drag in progress.
    drag: Option<(Pos2, Pos2)>,
    last: Option<Measurement>,
}

impl MeasureTool {
    pub fn new(unit: MeasureUnit) -> Self {
        Self {
            unit,
            ..Default::default()
        }
    }

    pub fn unit(&self) -> MeasureUnit {
        self.unit
    }

    pub fn set_unit(&mut self, unit: MeasureUnit) {
        self.unit = unit;
        if let Some(last) = &mut self.last {
            *last = Measurement::between(last.start, last.end, unit);
        }
    }

    /// Measures between two screen points.
    pub fn measure(&mut self, start: Pos2, end: Pos2, view: &ViewState) -> Measurement {
        let measurement = Measurement::between(
            view.screen_to_document(start),
            view.screen_to_document(end),
            self.unit,
        );
        self.last = Some(measurement);
        measurement
    }

    pub fn last(&self) -> Option<&Measurement> {
        self.last.as_ref()
    }

    /// Screen line of the drag in progress, for drawing.
    pub fn drag_line(&self) -> Option<(Pos2, Pos2)> {
        self.drag
    }
}

impl CanvasTool for MeasureTool {
    fn mode(&self) -> InteractiveMode {
        InteractiveMode::Measure
    }

    fn on_pointer_down(&mut self, pos: Pos2, _view: &ViewState) {
        self.drag = Some((pos, pos));
    }

    fn on_pointer_move(&mut self, pos: Pos2, _view: &ViewState) {
        if let Some((_, end)) = &mut self.drag {
            *end = pos;
        }
    }

    fn on_pointer_up(&mut self, pos: Pos2, view: &ViewState) -> Option<EditorEvent> {
        let (start, _) = self.drag.take()?;
        if start == pos {
            return None;
        }
        Some(EditorEvent::MeasureCompleted(self.measure(start, pos, view)))
    }

    fn reset(&mut self) {
        self.drag = None;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn test_measurement_in_units() {
        let m = Measurement::between(pos2(0.0, 0.0), pos2(96.0, 0.0), MeasureUnit::In);
        assert!((m.length - 1.0).abs() < 1e-5);
        assert!(m.angle.abs() < 1e-5);

        let m = Measurement::between(pos2(0.0, 0.0), pos2(0.0, 37.795_276), MeasureUnit::Cm);
        assert!((m.length - 1.0).abs() < 1e-4);
        assert!((m.angle - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_changing_unit_converts_last_measurement() {
        let mut tool = MeasureTool::new(MeasureUnit::Px);
        tool.last = Some(Measurement::between(pos2(0.0, 0.0), pos2(30.0, 40.0), MeasureUnit::Px));
        assert_eq!(tool.last().map(|m| m.length), Some(50.0));
        tool.set_unit(MeasureUnit::In);
        assert!((tool.last().map_or(0.0, |m| m.length) - 50.0 / 96.0).abs() < 1e-5);
    }
}
