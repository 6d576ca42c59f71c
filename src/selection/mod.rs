//! The selected element and how it follows document changes.

mod info;
mod node;

pub use info::{ElementInfo, Geometry};
pub use node::{NodeDescriptor, NodeRef, resolve_live_node, selectable_ancestor};

use crate::error::{EditorResult, ResolutionFailure};
use crate::event::{EditorEvent, EventBus, EventHandler};
use crate::svg::{NodePath, TreeHandle};

#[derive(Debug, Clone)]
struct Selected {
    node: NodeRef,
    descriptor: NodeDescriptor,
    info: ElementInfo,
}

/// At most one selected element of the active document.
#[derive(Debug)]
pub struct Selection {
    current: Option<Selected>,
    enabled: bool,
    event_bus: EventBus,
}

impl Selection {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            current: None,
            enabled: true,
            event_bus,
        }
    }

    /// Selects `node` and publishes its attribute summary.
    ///
    /// Selecting the node that is already selected does nothing. While
    /// selection is disabled the request is ignored.
    pub fn select(&mut self, node: NodeRef) -> EditorResult<()> {
        if !self.enabled {
            log::debug!("Selection disabled, ignoring select of {}", node.path());
            return Ok(());
        }
        if self.current.as_ref().is_some_and(|selected| selected.node == node) {
            return Ok(());
        }
        let selected = capture(&node).ok_or_else(|| ResolutionFailure::NodeLost(node.path().clone()))?;
        let info = selected.info.clone();
        self.current = Some(selected);
        log::debug!("Selected {} at {}", info.label(), node.path());
        self.event_bus.publish(EditorEvent::ElementSelected { node, info });
        Ok(())
    }

    /// Selects whatever a click on `clicked` should select: the nearest
    /// selectable ancestor, or nothing when the click lands on the root.
    pub fn select_at(&mut self, tree: &TreeHandle, clicked: &NodePath) -> EditorResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let target = tree
            .try_borrow()
            .ok()
            .and_then(|tree| selectable_ancestor(&tree, clicked));
        match target {
            Some(path) => self.select(NodeRef::new(TreeHandle::clone(tree), path)),
            None => {
                self.deselect();
                Ok(())
            }
        }
    }

    /// Clears the selection, publishing only if something was selected.
    pub fn deselect(&mut self) {
        if let Some(previous) = self.current.take() {
            log::debug!("Deselected {}", previous.node.path());
            self.event_bus.publish(EditorEvent::ElementDeselected);
        }
    }

    pub fn selected(&self) -> Option<&NodeRef> {
        self.current.as_ref().map(|selected| &selected.node)
    }

    pub fn info(&self) -> Option<&ElementInfo> {
        self.current.as_ref().map(|selected| &selected.info)
    }

    pub fn descriptor(&self) -> Option<&NodeDescriptor> {
        self.current.as_ref().map(|selected| &selected.descriptor)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling also clears the current selection.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.deselect();
        }
    }

    /// Moves the selection onto `tree`, the replacement of the tree it was
    /// made in. A node that cannot be found is dropped without an event.
    fn follow_replacement(&mut self, tree: &TreeHandle) {
        let Some(previous) = self.current.take() else {
            return;
        };
        let path = tree
            .try_borrow()
            .ok()
            .and_then(|tree| resolve_live_node(&previous.descriptor, &tree));
        let Some(selected) = path.and_then(|path| capture(&NodeRef::new(TreeHandle::clone(tree), path))) else {
            log::debug!("Selection lost after document reload");
            return;
        };
        let node = selected.node.clone();
        let info = selected.info.clone();
        self.current = Some(selected);
        self.event_bus.publish(EditorEvent::ElementSelected { node, info });
    }

    fn follow_removal(&mut self, removed: &NodePath) {
        let Some(previous) = self.current.take() else {
            return;
        };
        match previous
            .node
            .path()
            .after_removal(removed)
            .and_then(|path| capture(&NodeRef::new(TreeHandle::clone(previous.node.tree()), path)))
        {
            Some(selected) => self.current = Some(selected),
            None => {
                self.current = Some(previous);
                self.deselect();
            }
        }
    }

    fn refresh(&mut self, node: &NodeRef) {
        if let Some(selected) = &mut self.current {
            if selected.node == *node {
                if let Some(updated) = capture(node) {
                    *selected = updated;
                }
            }
        }
    }
}

fn capture(node: &NodeRef) -> Option<Selected> {
    let tree = node.tree().try_borrow().ok()?;
    let descriptor = NodeDescriptor::capture(&tree, node.path())?;
    let info = ElementInfo::from_element(tree.element(node.path())?);
    Some(Selected {
        node: node.clone(),
        descriptor,
        info,
    })
}

impl EventHandler for Selection {
    fn handle_event(&mut self, event: &EditorEvent) {
        match event {
            EditorEvent::DocumentLoaded(info) => self.follow_replacement(&info.tree),
            EditorEvent::DocumentSelected(_) | EditorEvent::DocumentClosed { .. } => self.deselect(),
            EditorEvent::LayerDeleted { path, .. } => self.follow_removal(path),
            EditorEvent::PropertyChanged { node, .. } => self.refresh(node),
            EditorEvent::CropStarted => self.set_enabled(false),
            EditorEvent::CropCompleted { .. } | EditorEvent::CropCancelled => self.set_enabled(true),
            _ => {}
        }
    }
}
