use std::fmt;
use std::rc::Rc;

use crate::svg::{self, Element, NodePath, SvgTree, TreeHandle};

/// Tags a click can land on; anything else is promoted to its nearest such ancestor.
const SELECTABLE_TAGS: [&str; 11] = [
    "circle", "ellipse", "line", "path", "polygon", "polyline", "rect", "text", "g", "image", "use",
];

/// A node inside a specific live tree.
///
/// Two references are equal only if they share the same tree handle and
/// the same path; a reparsed document never matches an older reference.
#[derive(Clone)]
pub struct NodeRef {
    tree: TreeHandle,
    path: NodePath,
}

impl NodeRef {
    pub fn new(tree: TreeHandle, path: NodePath) -> Self {
        Self { tree, path }
    }

    pub fn tree(&self) -> &TreeHandle {
        &self.tree
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn belongs_to(&self, tree: &TreeHandle) -> bool {
        Rc::ptr_eq(&self.tree, tree)
    }

    /// Runs `f` on the referenced element, if it still exists and the tree
    /// is not being mutated.
    pub fn with_element<R>(&self, f: impl FnOnce(&Element) -> R) -> Option<R> {
        let tree = self.tree.try_borrow().ok()?;
        tree.element(&self.path).map(f)
    }

    pub fn is_live(&self) -> bool {
        self.with_element(|_| ()).is_some()
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree) && self.path == other.path
    }
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("tree", &Rc::as_ptr(&self.tree))
            .field("path", &self.path)
            .finish()
    }
}

/// What is remembered about a node so it can be found again in a new tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub tag: String,
    pub id: Option<String>,
    /// Position among element siblings with the same tag.
    pub ordinal: usize,
    /// `None` for the root element.
    pub parent: Option<NodePath>,
    pub markup: String,
}

impl NodeDescriptor {
    pub fn capture(tree: &SvgTree, path: &NodePath) -> Option<Self> {
        let element = tree.element(path)?;
        let tag = element.tag();
        let parent = path.parent();
        let ordinal = match (&parent, path.last()) {
            (Some(parent_path), Some(index)) => tree
                .element(parent_path)?
                .child_elements()
                .take_while(|&(position, _)| position < index)
                .filter(|(_, sibling)| sibling.tag() == tag)
                .count(),
            _ => 0,
        };
        Some(Self {
            id: element.id().map(str::to_owned),
            markup: svg::serialize_element(element),
            tag,
            ordinal,
            parent,
        })
    }
}

/// Finds the node a descriptor refers to in `tree`.
///
/// Tried in order: the id anywhere in the tree; the same tag and ordinal
/// under the same parent path; the first element in document order with
/// identical markup. `None` means the node is gone.
pub fn resolve_live_node(descriptor: &NodeDescriptor, tree: &SvgTree) -> Option<NodePath> {
    if let Some(path) = descriptor.id.as_deref().and_then(|id| tree.find_by_id(id)) {
        return Some(path);
    }
    if let Some(path) = resolve_structural(descriptor, tree) {
        return Some(path);
    }
    tree.elements()
        .into_iter()
        .find(|(_, element)| svg::serialize_element(element) == descriptor.markup)
        .map(|(path, _)| path)
}

fn resolve_structural(descriptor: &NodeDescriptor, tree: &SvgTree) -> Option<NodePath> {
    let Some(parent_path) = &descriptor.parent else {
        return (tree.root.tag() == descriptor.tag).then(NodePath::root);
    };
    let parent = tree.element(parent_path)?;
    parent
        .child_elements()
        .filter(|(_, element)| element.tag() == descriptor.tag)
        .nth(descriptor.ordinal)
        .map(|(index, _)| parent_path.child(index))
}

/// Promotes a clicked node to the element that should be selected.
///
/// Returns `None` when the click resolves to the root (meaning "deselect").
pub fn selectable_ancestor(tree: &SvgTree, clicked: &NodePath) -> Option<NodePath> {
    let mut path = clicked.clone();
    while !path.is_root() {
        if let Some(element) = tree.element(&path) {
            if SELECTABLE_TAGS.contains(&element.tag().as_str()) {
                return Some(path);
            }
        }
        path = path.parent()?;
    }
    None
}
