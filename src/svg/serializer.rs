use quick_xml::escape::{escape, partial_escape};
use std::fmt::Write;

use super::{Element, Node, SvgTree, parse};

const INDENT: &str = "  ";

/// Serializes a tree to its canonical compact text.
///
/// Whitespace inside the root is written back exactly as parsed, so
/// `serialize(&parse(&serialize(&tree))?)` reproduces the same text.
pub fn serialize(tree: &SvgTree) -> String {
    let mut out = String::new();
    if let Some(declaration) = &tree.declaration {
        let _ = writeln!(out, "<?{}?>", declaration);
    }
    for node in &tree.prolog {
        write_node(&mut out, node);
        out.push('\n');
    }
    write_element(&mut out, &tree.root);
    for node in &tree.epilog {
        out.push('\n');
        write_node(&mut out, node);
    }
    out
}

/// Serializes a single element and its subtree.
pub fn serialize_element(element: &Element) -> String {
    let mut out = String::new();
    write_element(&mut out, element);
    out
}

/// Serializes a tree with one element per line and two-space indentation.
///
/// Elements that carry character data are written inline so their text is
/// not altered.
pub fn serialize_pretty(tree: &SvgTree) -> String {
    let mut out = String::new();
    if let Some(declaration) = &tree.declaration {
        let _ = writeln!(out, "<?{}?>", declaration);
    }
    for node in &tree.prolog {
        write_node(&mut out, node);
        out.push('\n');
    }
    write_pretty(&mut out, &tree.root, 0);
    for node in &tree.epilog {
        write_node(&mut out, node);
        out.push('\n');
    }
    out
}

/// Pretty prints SVG text, returning it unchanged if it does not parse.
pub fn format_svg(text: &str) -> String {
    match parse(text) {
        Ok(tree) => serialize_pretty(&tree),
        Err(err) => {
            log::debug!("Leaving unparseable SVG unformatted: {}", err);
            text.to_owned()
        }
    }
}

fn write_open_tag(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(&element.name);
    for attribute in &element.attributes {
        let _ = write!(out, " {}=\"{}\"", attribute.name, escape(attribute.value.as_str()));
    }
}

fn write_element(out: &mut String, element: &Element) {
    write_open_tag(out, element);
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &element.children {
        write_node(out, child);
    }
    let _ = write!(out, "</{}>", element.name);
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(element) => write_element(out, element),
        Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
        Node::CData(text) => {
            let _ = write!(out, "<![CDATA[{}]]>", text);
        }
        Node::Comment(text) => {
            let _ = write!(out, "<!--{}-->", text);
        }
        Node::ProcessingInstruction(text) => {
            let _ = write!(out, "<?{}?>", text);
        }
        Node::Doctype(text) => {
            let _ = write!(out, "<!DOCTYPE {}>", text);
        }
    }
}

fn has_character_data(element: &Element) -> bool {
    element.children.iter().any(|child| match child {
        Node::Text(text) => !text.trim().is_empty(),
        Node::CData(_) => true,
        _ => false,
    })
}

fn write_pretty(out: &mut String, element: &Element, depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);
    if has_character_data(element) {
        write_element(out, element);
        out.push('\n');
        return;
    }
    let children: Vec<&Node> = element
        .children
        .iter()
        .filter(|child| !matches!(child, Node::Text(_)))
        .collect();
    write_open_tag(out, element);
    if children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    for child in children {
        match child {
            Node::Element(child) => write_pretty(out, child, depth + 1),
            other => {
                out.push_str(&indent);
                out.push_str(INDENT);
                write_node(out, other);
                out.push('\n');
            }
        }
    }
    let _ = writeln!(out, "{}</{}>", indent, element.name);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "<?xml version=\"1.0\"?>\n<!-- logo -->\n<svg width=\"10\">\n  <rect id=\"a\" title=\"x &amp; &quot;y&quot;\"/>\n  <text>1 &lt; 2</text>\n</svg>";

    #[test]
    fn test_serialize_round_trips() {
        let tree = parse(SAMPLE).unwrap();
        let text = serialize(&tree);
        assert_eq!(text, SAMPLE);
        assert_eq!(serialize(&parse(&text).unwrap()), text);
    }

    #[test]
    fn test_pretty_indents_nested_elements() {
        let tree = parse("<svg><g><rect/></g><text>hi</text></svg>").unwrap();
        assert_eq!(
            serialize_pretty(&tree),
            "<svg>\n  <g>\n    <rect/>\n  </g>\n  <text>hi</text>\n</svg>\n"
        );
    }

    #[test]
    fn test_format_svg_leaves_invalid_text_alone() {
        assert_eq!(format_svg("<svg><g></svg>"), "<svg><g></svg>");
    }
}
