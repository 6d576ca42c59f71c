use eframe::egui::Color32;

use crate::document::DocumentId;
use crate::error::{EditorResult, ResolutionFailure};
use crate::event::{EditorEvent, EventBus};
use crate::selection::NodeRef;
use crate::svg;

/// Pseudo attribute name used for character content edits.
pub const TEXT_CONTENT: &str = "textContent";

/// Writes attributes and text of live nodes and requests a snapshot for each edit.
#[derive(Debug, Clone)]
pub struct PropertyMutator {
    event_bus: EventBus,
}

impl PropertyMutator {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Sets `name` to `value` on the node. Values are written as given;
    /// callers clamp ranges such as opacity themselves.
    pub fn set_attribute(
        &self,
        document: Option<DocumentId>,
        node: &NodeRef,
        name: &str,
        value: &str,
    ) -> EditorResult<()> {
        if name == TEXT_CONTENT {
            return self.set_text(document, node, value);
        }
        let (old_value, content) = {
            let mut tree = node
                .tree()
                .try_borrow_mut()
                .map_err(|_| ResolutionFailure::NodeLost(node.path().clone()))?;
            let element = tree
                .element_mut(node.path())
                .ok_or_else(|| ResolutionFailure::NodeLost(node.path().clone()))?;
            let old_value = element.set_attr(name, value);
            (old_value, svg::serialize(&tree))
        };
        log::debug!("Set {}={} on {}", name, value, node.path());

        self.event_bus.publish(EditorEvent::PropertyChanged {
            node: node.clone(),
            name: name.to_owned(),
            old_value,
            new_value: value.to_owned(),
        });
        self.event_bus.publish(EditorEvent::SnapshotRequested {
            document,
            description: format!("change {}", name),
            content,
        });
        Ok(())
    }

    /// Replaces the node's character content with `text`.
    pub fn set_text(&self, document: Option<DocumentId>, node: &NodeRef, text: &str) -> EditorResult<()> {
        let (old_value, content) = {
            let mut tree = node
                .tree()
                .try_borrow_mut()
                .map_err(|_| ResolutionFailure::NodeLost(node.path().clone()))?;
            let element = tree
                .element_mut(node.path())
                .ok_or_else(|| ResolutionFailure::NodeLost(node.path().clone()))?;
            let old_value = element.text_content();
            element.set_text_content(text);
            (old_value, svg::serialize(&tree))
        };

        self.event_bus.publish(EditorEvent::PropertyChanged {
            node: node.clone(),
            name: TEXT_CONTENT.to_owned(),
            old_value: Some(old_value),
            new_value: text.to_owned(),
        });
        self.event_bus.publish(EditorEvent::SnapshotRequested {
            document,
            description: "change text content".to_owned(),
            content,
        });
        Ok(())
    }
}

/// Clamps an opacity to `[0, 1]` and formats it for an attribute.
pub fn clamp_opacity(value: f64) -> String {
    let value = if value.is_nan() { 1.0 } else { value.clamp(0.0, 1.0) };
    svg::format_number(value)
}

/// Parses `#rgb` or `#rrggbb`. Anything else (`none`, named colors,
/// `url(...)`) yields `None`.
pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.trim().strip_prefix('#')?;
    let channel = |text: &str| u8::from_str_radix(text, 16).ok();
    match hex.len() {
        3 => {
            let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some(Color32::from_rgb(digits.next()??, digits.next()??, digits.next()??))
        }
        6 => Some(Color32::from_rgb(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        _ => None,
    }
}

pub fn to_hex_color(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}
