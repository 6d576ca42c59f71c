use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::DocumentId;
use crate::error::{EditorError, EditorResult, ResolutionFailure};
use crate::event::{EditorEvent, EventBus, EventHandler};
use crate::selection::{NodeDescriptor, NodeRef, resolve_live_node};
use crate::svg::{self, Element, NodePath, SvgTree, TreeHandle};

/// Root children that never show up as layers.
const NON_LAYER_TAGS: [&str; 3] = ["defs", "style", "metadata"];

/// Identifies a layer: the element id, or `layer_<n>` for elements without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A direct child of the root element, as listed in the layers panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub tag: String,
    pub name: String,
    pub visible: bool,
    /// True when `id` comes from the element's `id` attribute.
    pub element_backed: bool,
    /// Position among layers with the same tag.
    pub ordinal: usize,
    /// Location in the tree the index was built from.
    pub path: NodePath,
    pub markup: String,
}

impl Layer {
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            tag: self.tag.clone(),
            id: self.element_backed.then(|| self.id.as_str().to_owned()),
            ordinal: self.ordinal,
            parent: Some(NodePath::root()),
            markup: self.markup.clone(),
        }
    }
}

/// Human readable name for an element in the layers panel.
pub fn display_name(element: &Element) -> String {
    if let Some(id) = element.id() {
        return id.to_owned();
    }
    let tag = element.tag();
    let label = match tag.as_str() {
        "rect" => "Rectangle",
        "circle" => "Circle",
        "ellipse" => "Ellipse",
        "line" => "Line",
        "polyline" => "Polyline",
        "polygon" => "Polygon",
        "path" => "Path",
        "g" => "Group",
        "image" => "Image",
        "use" => "Use",
        "text" => {
            let text = element.text_content();
            let preview: String = text.chars().take(10).collect();
            let ellipsis = if text.chars().count() > 10 { "..." } else { "" };
            return format!("Text: {}{}", preview, ellipsis);
        }
        _ => return tag,
    };
    label.to_owned()
}

/// Hidden means `display="none"` or an inline `display:none`.
pub fn is_visible(element: &Element) -> bool {
    let attribute_hidden = element.attr("display").is_some_and(|value| value.trim() == "none");
    let style_hidden = element
        .attr("style")
        .and_then(|style| style_property(style, "display"))
        .is_some_and(|value| value == "none");
    !(attribute_hidden || style_hidden)
}

fn style_property(style: &str, name: &str) -> Option<String> {
    style.split(';').find_map(|declaration| {
        let (key, value) = declaration.split_once(':')?;
        (key.trim() == name).then(|| value.trim().to_owned())
    })
}

/// Returns `style` with `name` removed and, if given, set to `value`.
fn with_style_property(style: &str, name: &str, value: Option<&str>) -> String {
    let mut declarations: Vec<String> = style
        .split(';')
        .map(str::trim)
        .filter(|declaration| !declaration.is_empty())
        .filter(|declaration| {
            declaration
                .split_once(':')
                .is_none_or(|(key, _)| key.trim() != name)
        })
        .map(str::to_owned)
        .collect();
    if let Some(value) = value {
        declarations.push(format!("{}: {}", name, value));
    }
    declarations.join("; ")
}

pub fn set_visible(element: &mut Element, visible: bool) {
    let style = element.attr("style").unwrap_or_default().to_owned();
    if visible {
        element.remove_attr("display");
        let style = with_style_property(&style, "display", None);
        if style.is_empty() {
            element.remove_attr("style");
        } else {
            element.set_attr("style", &style);
        }
    } else {
        element.set_attr("display", "none");
        element.set_attr("style", &with_style_property(&style, "display", Some("none")));
    }
}

/// Builds the layer list for a tree, in document order.
pub fn collect_layers(tree: &SvgTree) -> Vec<Layer> {
    let mut layers: Vec<Layer> = Vec::new();
    for (position, (index, element)) in tree.root.child_elements().enumerate() {
        let tag = element.tag();
        if NON_LAYER_TAGS.contains(&tag.as_str()) {
            continue;
        }
        let ordinal = layers.iter().filter(|layer| layer.tag == tag).count();
        let (id, element_backed) = match element.id() {
            Some(id) => (LayerId::new(id), true),
            None => (LayerId::new(format!("layer_{}", position)), false),
        };
        layers.push(Layer {
            id,
            name: display_name(element),
            visible: is_visible(element),
            element_backed,
            ordinal,
            path: NodePath::root().child(index),
            markup: svg::serialize_element(element),
            tag,
        });
    }
    layers
}

/// Flat layer projection of the active document.
#[derive(Debug)]
pub struct LayerIndex {
    document: Option<DocumentId>,
    tree: Option<TreeHandle>,
    layers: Vec<Layer>,
    event_bus: EventBus,
}

impl LayerIndex {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            document: None,
            tree: None,
            layers: Vec::new(),
            event_bus,
        }
    }

    /// Recomputes every layer from `tree`.
    pub fn rebuild(&mut self, document: DocumentId, tree: &TreeHandle) {
        self.layers = match tree.try_borrow() {
            Ok(tree) => collect_layers(&tree),
            Err(_) => {
                log::error!("Cannot rebuild layers while the tree is being edited");
                Vec::new()
            }
        };
        self.document = Some(document);
        self.tree = Some(TreeHandle::clone(tree));
        log::debug!("Rebuilt {} layers", self.layers.len());
        self.event_bus.publish(EditorEvent::LayersRebuilt {
            document,
            count: self.layers.len(),
        });
    }

    pub fn clear(&mut self) {
        self.document = None;
        self.tree = None;
        self.layers.clear();
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| &layer.id == id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Finds the live element of a layer.
    pub fn resolve(&self, id: &LayerId) -> Result<NodePath, ResolutionFailure> {
        let layer = self
            .get(id)
            .ok_or_else(|| ResolutionFailure::UnknownLayer(id.to_string()))?;
        let lost = || ResolutionFailure::LayerLost(layer.name.clone());
        let tree = self.tree.as_ref().ok_or_else(lost)?;
        let tree = tree.try_borrow().map_err(|_| lost())?;
        resolve_live_node(&layer.descriptor(), &tree)
            .filter(|path| path.depth() == 1)
            .ok_or_else(lost)
    }

    pub fn node_for(&self, id: &LayerId) -> EditorResult<NodeRef> {
        let path = self.resolve(id)?;
        let tree = self.tree.as_ref().ok_or(EditorError::NoActiveDocument)?;
        Ok(NodeRef::new(TreeHandle::clone(tree), path))
    }

    /// Layer whose element is, or contains, the selected node.
    pub fn highlighted_layer(&self, selected: Option<&NodeRef>) -> Option<&Layer> {
        let node = selected?;
        let tree = self.tree.as_ref()?;
        if !node.belongs_to(tree) {
            return None;
        }
        let top = node.path().indices().first()?;
        self.layers
            .iter()
            .find(|layer| layer.path.indices().first() == Some(top))
    }

    pub fn set_visibility(&mut self, id: &LayerId, visible: bool) -> EditorResult<()> {
        let path = self.resolve(id)?;
        let (markup, content) = self.edit(&path, |element| set_visible(element, visible))?;
        let name = match self.layers.iter_mut().find(|layer| &layer.id == id) {
            Some(layer) => {
                layer.visible = visible;
                layer.path = path;
                layer.markup = markup;
                layer.name.clone()
            }
            None => id.to_string(),
        };
        log::info!("{} layer {}", if visible { "Showing" } else { "Hiding" }, name);

        self.event_bus.publish(EditorEvent::LayerVisibilityChanged {
            layer_id: id.clone(),
            visible,
        });
        self.request_snapshot(
            format!("{} layer {}", if visible { "show" } else { "hide" }, name),
            content,
        );
        Ok(())
    }

    /// Flips visibility and returns the new state.
    pub fn toggle_visibility(&mut self, id: &LayerId) -> EditorResult<bool> {
        let path = self.resolve(id)?;
        let visible = self
            .tree
            .as_ref()
            .and_then(|tree| tree.try_borrow().ok()?.element(&path).map(is_visible))
            .ok_or_else(|| ResolutionFailure::NodeLost(path.clone()))?;
        self.set_visibility(id, !visible)?;
        Ok(!visible)
    }

    pub fn delete_layer(&mut self, id: &LayerId) -> EditorResult<()> {
        let path = self.resolve(id)?;
        let content = {
            let tree = self.tree.as_ref().ok_or(EditorError::NoActiveDocument)?;
            let mut tree = tree
                .try_borrow_mut()
                .map_err(|_| ResolutionFailure::LayerLost(id.to_string()))?;
            tree.remove(&path)
                .ok_or_else(|| ResolutionFailure::NodeLost(path.clone()))?;
            svg::serialize(&tree)
        };
        let name = self
            .get(id)
            .map_or_else(|| id.to_string(), |layer| layer.name.clone());
        self.layers.retain(|layer| &layer.id != id);
        for layer in &mut self.layers {
            if let Some(shifted) = layer.path.after_removal(&path) {
                layer.path = shifted;
            }
        }
        self.resync();
        log::info!("Deleted layer {}", name);

        self.event_bus.publish(EditorEvent::LayerDeleted {
            layer_id: id.clone(),
            name: name.clone(),
            path,
        });
        self.request_snapshot(format!("delete layer {}", name), content);
        Ok(())
    }

    /// Renames a layer. Element-backed layers also rename the element id.
    pub fn rename_layer(&mut self, id: &LayerId, new_name: &str) -> EditorResult<LayerId> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(EditorError::InvalidName);
        }
        let path = self.resolve(id)?;
        let layer = self
            .get(id)
            .ok_or_else(|| ResolutionFailure::UnknownLayer(id.to_string()))?;
        let old_name = layer.name.clone();
        let element_backed = layer.element_backed;
        if element_backed && new_name != id.as_str() && self.id_in_use(new_name) {
            return Err(EditorError::IdInUse(new_name.to_owned()));
        }

        let (markup, content) = self.edit(&path, |element| {
            if element_backed {
                element.set_attr("id", new_name);
            }
        })?;
        let new_id = if element_backed {
            LayerId::new(new_name)
        } else {
            id.clone()
        };
        if let Some(layer) = self.layers.iter_mut().find(|layer| &layer.id == id) {
            layer.name = new_name.to_owned();
            layer.id = new_id.clone();
            layer.path = path;
            layer.markup = markup;
        }
        log::info!("Renamed layer {} to {}", old_name, new_name);

        self.event_bus.publish(EditorEvent::LayerRenamed {
            old_id: id.clone(),
            new_id: new_id.clone(),
            old_name: old_name.clone(),
            new_name: new_name.to_owned(),
        });
        self.request_snapshot(format!("rename layer {} to {}", old_name, new_name), content);
        Ok(new_id)
    }

    /// Re-reads every layer from the live tree at its current path, keeping
    /// the layer ids callers already hold. Ordinals and markup must match the
    /// tree or structural resolution lands on the wrong sibling.
    fn resync(&mut self) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        let Ok(tree) = tree.try_borrow() else {
            log::warn!("Cannot refresh layers while the tree is being edited");
            return;
        };
        for layer in &mut self.layers {
            let (Some(element), Some(descriptor)) = (
                tree.element(&layer.path),
                NodeDescriptor::capture(&tree, &layer.path),
            ) else {
                log::debug!("Layer {} has no element at {}", layer.id, layer.path);
                continue;
            };
            match element.id() {
                Some(element_id) => {
                    layer.id = LayerId::new(element_id);
                    layer.element_backed = true;
                }
                None => layer.element_backed = false,
            }
            layer.name = display_name(element);
            layer.visible = is_visible(element);
            layer.ordinal = descriptor.ordinal;
            layer.markup = descriptor.markup;
        }
    }

    fn id_in_use(&self, id: &str) -> bool {
        self.tree
            .as_ref()
            .and_then(|tree| tree.try_borrow().ok().map(|tree| tree.find_by_id(id).is_some()))
            .unwrap_or(false)
    }

    /// Applies `edit` to the element at `path`; returns its new markup and
    /// the serialized document.
    fn edit(&self, path: &NodePath, edit: impl FnOnce(&mut Element)) -> EditorResult<(String, String)> {
        let tree = self.tree.as_ref().ok_or(EditorError::NoActiveDocument)?;
        let mut tree = tree
            .try_borrow_mut()
            .map_err(|_| ResolutionFailure::NodeLost(path.clone()))?;
        let element = tree
            .element_mut(path)
            .ok_or_else(|| ResolutionFailure::NodeLost(path.clone()))?;
        edit(element);
        let markup = svg::serialize_element(element);
        Ok((markup, svg::serialize(&tree)))
    }

    fn request_snapshot(&self, description: String, content: String) {
        self.event_bus.publish(EditorEvent::SnapshotRequested {
            document: self.document,
            description,
            content,
        });
    }
}

impl EventHandler for LayerIndex {
    fn handle_event(&mut self, event: &EditorEvent) {
        match event {
            EditorEvent::DocumentLoaded(info) | EditorEvent::DocumentSelected(Some(info)) => {
                self.rebuild(info.id, &info.tree)
            }
            EditorEvent::DocumentSelected(None) => self.clear(),
            EditorEvent::PropertyChanged { node, .. } => {
                if self.tree.as_ref().is_some_and(|tree| node.belongs_to(tree)) {
                    self.resync();
                }
            }
            _ => {}
        }
    }
}
