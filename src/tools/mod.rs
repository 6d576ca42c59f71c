//! Interactive canvas modes: crop and measure.
//!
//! At most one mode is active at a time. [`ModeRegister`] owns that rule
//! so the tools never need to know about each other.

mod crop;
mod measure;

pub use crop::{CropTool, crop_tree};
pub use measure::{MeasureTool, MeasureUnit, Measurement};

use eframe::egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::DocumentId;
use crate::error::{EditorError, EditorResult};
use crate::event::{EditorEvent, EventBus, EventHandler};
use crate::svg::{self, TreeHandle};
use crate::view::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractiveMode {
    Crop,
    Measure,
}

impl fmt::Display for InteractiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractiveMode::Crop => f.write_str("crop"),
            InteractiveMode::Measure => f.write_str("measure"),
        }
    }
}

/// Holds the single active interactive mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModeRegister {
    active: Option<InteractiveMode>,
}

impl ModeRegister {
    pub fn active(&self) -> Option<InteractiveMode> {
        self.active
    }

    pub fn is_active(&self, mode: InteractiveMode) -> bool {
        self.active == Some(mode)
    }

    pub fn can_activate(&self, mode: InteractiveMode) -> bool {
        self.active.is_none_or(|active| active == mode)
    }

    /// Activates `mode`. Fails if a different mode is already active,
    /// leaving that mode in place.
    pub fn activate(&mut self, mode: InteractiveMode) -> EditorResult<()> {
        match self.active {
            Some(active) if active != mode => Err(EditorError::ToolConflict {
                active,
                requested: mode,
            }),
            _ => {
                self.active = Some(mode);
                Ok(())
            }
        }
    }

    /// Deactivates `mode` if it is the active one. Returns whether it was.
    pub fn release(&mut self, mode: InteractiveMode) -> bool {
        if self.active == Some(mode) {
            self.active = None;
            true
        } else {
            false
        }
    }
}

/// Pointer handling shared by the canvas tools. Positions are in screen
/// coordinates relative to the canvas.
pub trait CanvasTool {
    fn mode(&self) -> InteractiveMode;

    fn on_pointer_down(&mut self, pos: Pos2, view: &ViewState);

    fn on_pointer_move(&mut self, pos: Pos2, view: &ViewState);

    /// Finishes a gesture. Returns an event to publish, if the gesture produced one.
    fn on_pointer_up(&mut self, pos: Pos2, view: &ViewState) -> Option<EditorEvent>;

    /// Drops any gesture or result in progress.
    fn reset(&mut self);
}

/// The crop and measure tools behind one mode register.
#[derive(Debug)]
pub struct Tools {
    modes: ModeRegister,
    crop: CropTool,
    measure: MeasureTool,
    event_bus: EventBus,
}

impl Tools {
    pub fn new(event_bus: EventBus, unit: MeasureUnit) -> Self {
        Self {
            modes: ModeRegister::default(),
            crop: CropTool::default(),
            measure: MeasureTool::new(unit),
            event_bus,
        }
    }

    pub fn modes(&self) -> &ModeRegister {
        &self.modes
    }

    pub fn active_mode(&self) -> Option<InteractiveMode> {
        self.modes.active()
    }

    pub fn crop(&self) -> &CropTool {
        &self.crop
    }

    pub fn crop_mut(&mut self) -> &mut CropTool {
        &mut self.crop
    }

    pub fn measure_tool(&self) -> &MeasureTool {
        &self.measure
    }

    /// Enters crop mode. Requires an open document and no other active mode.
    pub fn start_crop(&mut self, has_document: bool) -> EditorResult<()> {
        if !has_document {
            return Err(EditorError::NothingToCrop);
        }
        if self.modes.is_active(InteractiveMode::Crop) {
            return Ok(());
        }
        self.modes.activate(InteractiveMode::Crop)?;
        self.crop.reset();
        log::info!("Crop mode started");
        self.event_bus.publish(EditorEvent::CropStarted);
        Ok(())
    }

    /// Crops the root of `tree` to the selected region and leaves crop mode.
    pub fn apply_crop(&mut self, document: Option<DocumentId>, tree: &TreeHandle) -> EditorResult<Rect> {
        if !self.modes.is_active(InteractiveMode::Crop) {
            return Err(EditorError::NothingToCrop);
        }
        let region = self.crop.region().ok_or(EditorError::NothingToCrop)?;
        let content = {
            let mut tree = tree.try_borrow_mut().map_err(|_| EditorError::NothingToCrop)?;
            crop_tree(&mut tree, region)?;
            svg::serialize(&tree)
        };
        self.modes.release(InteractiveMode::Crop);
        self.crop.reset();
        log::info!("Cropped to {:?}", region);

        self.event_bus.publish(EditorEvent::SnapshotRequested {
            document,
            description: "crop SVG".to_owned(),
            content,
        });
        self.event_bus.publish(EditorEvent::CropCompleted { region });
        Ok(region)
    }

    /// Leaves crop mode without changing the document.
    pub fn cancel_crop(&mut self) {
        if self.modes.release(InteractiveMode::Crop) {
            self.crop.reset();
            log::debug!("Crop cancelled");
            self.event_bus.publish(EditorEvent::CropCancelled);
        }
    }

    /// Turns measure mode on or off. Returns whether it is now on.
    pub fn toggle_measure(&mut self) -> EditorResult<bool> {
        if self.modes.release(InteractiveMode::Measure) {
            self.measure.reset();
            self.event_bus.publish(EditorEvent::MeasureEnded);
            return Ok(false);
        }
        self.modes.activate(InteractiveMode::Measure)?;
        self.event_bus.publish(EditorEvent::MeasureStarted);
        Ok(true)
    }

    /// Measures between two screen points. `None` unless measure mode is on.
    pub fn measure(&mut self, start: Pos2, end: Pos2, view: &ViewState) -> Option<Measurement> {
        if !self.modes.is_active(InteractiveMode::Measure) {
            return None;
        }
        let measurement = self.measure.measure(start, end, view);
        self.event_bus.publish(EditorEvent::MeasureCompleted(measurement));
        Some(measurement)
    }

    pub fn set_measure_unit(&mut self, unit: MeasureUnit) {
        self.measure.set_unit(unit);
    }

    fn active_tool(&mut self) -> Option<&mut dyn CanvasTool> {
        match self.modes.active()? {
            InteractiveMode::Crop => Some(&mut self.crop),
            InteractiveMode::Measure => Some(&mut self.measure),
        }
    }

    /// Routes canvas pointer input to the active tool. Returns false when
    /// no tool is active and the input should go to selection instead.
    pub fn pointer_down(&mut self, pos: Pos2, view: &ViewState) -> bool {
        match self.active_tool() {
            Some(tool) => {
                tool.on_pointer_down(pos, view);
                true
            }
            None => false,
        }
    }

    pub fn pointer_move(&mut self, pos: Pos2, view: &ViewState) {
        if let Some(tool) = self.active_tool() {
            tool.on_pointer_move(pos, view);
        }
    }

    pub fn pointer_up(&mut self, pos: Pos2, view: &ViewState) {
        let event = self.active_tool().and_then(|tool| tool.on_pointer_up(pos, view));
        if let Some(event) = event {
            self.event_bus.publish(event);
        }
    }
}

impl EventHandler for Tools {
    fn handle_event(&mut self, event: &EditorEvent) {
        match event {
            EditorEvent::DocumentLoaded(_) | EditorEvent::DocumentSelected(_) => self.cancel_crop(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_register_rejects_second_mode() {
        let mut modes = ModeRegister::default();
        modes.activate(InteractiveMode::Crop).unwrap();
        modes.activate(InteractiveMode::Crop).unwrap();
        assert_eq!(
            modes.activate(InteractiveMode::Measure),
            Err(EditorError::ToolConflict {
                active: InteractiveMode::Crop,
                requested: InteractiveMode::Measure,
            })
        );
        assert_eq!(modes.active(), Some(InteractiveMode::Crop));
        assert!(!modes.release(InteractiveMode::Measure));
        assert!(modes.release(InteractiveMode::Crop));
        assert!(modes.can_activate(InteractiveMode::Measure));
    }

    #[test]
    fn test_start_crop_requires_document() {
        let mut tools = Tools::new(EventBus::new(), MeasureUnit::Px);
        assert_eq!(tools.start_crop(false), Err(EditorError::NothingToCrop));
        assert_eq!(tools.active_mode(), None);
    }

    #[test]
    fn test_measure_toggle() {
        let mut tools = Tools::new(EventBus::new(), MeasureUnit::Px);
        assert_eq!(tools.toggle_measure(), Ok(true));
        assert!(tools.start_crop(true).is_err());
        assert_eq!(tools.toggle_measure(), Ok(false));
        assert!(tools.start_crop(true).is_ok());
    }

    #[test]
    fn test_apply_without_region_fails() {
        let tree = svg::new_handle(svg::parse("<svg/>").unwrap());
        let mut tools = Tools::new(EventBus::new(), MeasureUnit::Px);
        tools.start_crop(true).unwrap();
        assert_eq!(tools.apply_crop(None, &tree), Err(EditorError::NothingToCrop));
        assert_eq!(tools.active_mode(), Some(InteractiveMode::Crop));
    }
}
