use super::NodePath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A child node of an element, or a top-level node around the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, stored unescaped.
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    /// Only found before the root element.
    Doctype(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name as written in the source, e.g. `rect` or `svg:rect`.
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Tag name without a namespace prefix, case preserved.
    pub fn tag(&self) -> String {
        let local = self.name.rsplit(':').next().unwrap_or(&self.name);
        local.to_owned()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|attribute| attribute.name == name)
    }

    /// Sets an attribute, keeping its position if it already exists.
    /// Returns the previous value.
    pub fn set_attr(&mut self, name: &str, value: &str) -> Option<String> {
        match self.attributes.iter_mut().find(|attribute| attribute.name == name) {
            Some(attribute) => Some(std::mem::replace(&mut attribute.value, value.to_owned())),
            None => {
                self.attributes.push(Attribute::new(name, value));
                None
            }
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let position = self.attributes.iter().position(|attribute| attribute.name == name)?;
        Some(self.attributes.remove(position).value)
    }

    /// The `id` attribute, if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// Element children with their index in `children`.
    pub fn child_elements(&self) -> impl Iterator<Item = (usize, &Element)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(index, child)| child.as_element().map(|element| (index, element)))
    }

    pub fn child_element_count(&self) -> usize {
        self.child_elements().count()
    }

    /// Concatenated character data of all descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(self, &mut text);
        text
    }

    /// Replaces every child with a single text node.
    pub fn set_text_content(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text.to_owned()));
        }
    }
}

fn collect_text(element: &Element, text: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(value) | Node::CData(value) => text.push_str(value),
            Node::Element(element) => collect_text(element, text),
            _ => {}
        }
    }
}

/// A parsed SVG document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgTree {
    /// Contents of the `<?xml ...?>` declaration, without the delimiters.
    pub declaration: Option<String>,
    /// Doctype, comments and processing instructions before the root.
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Comments and processing instructions after the root.
    pub epilog: Vec<Node>,
}

impl SvgTree {
    pub fn new(root: Element) -> Self {
        Self {
            declaration: None,
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    pub fn node(&self, path: &NodePath) -> Option<&Node> {
        let (&last, parents) = path.indices().split_last()?;
        let mut element = &self.root;
        for &index in parents {
            element = element.children.get(index)?.as_element()?;
        }
        element.children.get(last)
    }

    pub fn element(&self, path: &NodePath) -> Option<&Element> {
        if path.is_root() {
            return Some(&self.root);
        }
        self.node(path)?.as_element()
    }

    pub fn element_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        let mut element = &mut self.root;
        for &index in path.indices() {
            element = element.children.get_mut(index)?.as_element_mut()?;
        }
        Some(element)
    }

    /// Detaches the node at `path`. The root element cannot be removed.
    pub fn remove(&mut self, path: &NodePath) -> Option<Node> {
        let index = path.last()?;
        let parent = self.element_mut(&path.parent()?)?;
        if index >= parent.children.len() {
            return None;
        }
        Some(parent.children.remove(index))
    }

    /// Every element, root included, in document order.
    pub fn elements(&self) -> Vec<(NodePath, &Element)> {
        let mut found = Vec::new();
        walk(&self.root, NodePath::root(), &mut found);
        found
    }

    /// First element in document order whose `id` equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodePath> {
        if id.is_empty() {
            return None;
        }
        self.elements()
            .into_iter()
            .find(|(_, element)| element.attr("id") == Some(id))
            .map(|(path, _)| path)
    }
}

fn walk<'a>(element: &'a Element, path: NodePath, found: &mut Vec<(NodePath, &'a Element)>) {
    found.push((path.clone(), element));
    for (index, child) in element.child_elements() {
        walk(child, path.child(index), found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SvgTree {
        let group = Element::new("g")
            .with_attr("id", "group")
            .with_child(Node::Element(Element::new("circle").with_attr("id", "inner")));
        let root = Element::new("svg")
            .with_child(Node::Text("\n".into()))
            .with_child(Node::Element(Element::new("rect").with_attr("id", "r1")))
            .with_child(Node::Element(group));
        SvgTree::new(root)
    }

    #[test]
    fn test_find_by_id_descends_into_groups() {
        let tree = sample();
        assert_eq!(tree.find_by_id("inner"), Some(NodePath::from_indices(vec![2, 0])));
        assert_eq!(tree.find_by_id("r1"), Some(NodePath::from_indices(vec![1])));
        assert_eq!(tree.find_by_id("missing"), None);
    }

    #[test]
    fn test_remove_detaches_node() {
        let mut tree = sample();
        let removed = tree.remove(&NodePath::from_indices(vec![1]));
        assert!(matches!(removed, Some(Node::Element(ref e)) if e.name == "rect"));
        assert_eq!(tree.root.child_element_count(), 1);
        assert!(tree.remove(&NodePath::root()).is_none());
    }

    #[test]
    fn test_set_attr_keeps_order_and_returns_old_value() {
        let mut element = Element::new("rect").with_attr("x", "1").with_attr("y", "2");
        assert_eq!(element.set_attr("x", "5"), Some("1".to_owned()));
        assert_eq!(element.attributes[0].name, "x");
        assert_eq!(element.attr("x"), Some("5"));
        assert_eq!(element.remove_attr("y"), Some("2".to_owned()));
        assert!(!element.has_attr("y"));
    }

    #[test]
    fn test_tag_strips_prefix_and_keeps_case() {
        assert_eq!(Element::new("svg:rect").tag(), "rect");
        assert_eq!(Element::new("linearGradient").tag(), "linearGradient");
    }
}
