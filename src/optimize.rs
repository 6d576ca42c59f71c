//! Built-in SVG optimizer.
//!
//! A conservative set of tree passes: nothing here changes how the image
//! renders, only how many bytes it takes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::svg::{self, Element, Node, SvgTree};

/// Attributes that have no effect in a standalone SVG file.
const REDUNDANT_ATTRIBUTES: &[&str] = &["version", "xml:space", "enable-background", "xmlns:svg", "space"];

/// Presentation attributes whose value equals the SVG default.
const DEFAULT_VALUES: &[(&str, &str)] = &[
    ("stroke-opacity", "1"),
    ("stroke-width", "1"),
    ("fill-opacity", "1"),
    ("opacity", "1"),
    ("stroke-dasharray", "none"),
    ("stroke-dashoffset", "0"),
    ("stroke-miterlimit", "4"),
];

/// Attributes whose text is a name, never a number list.
const NON_NUMERIC_ATTRIBUTES: &[&str] = &["id", "class", "href", "xlink:href"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeOptions {
    /// Decimal places kept when rounding numbers.
    pub precision: u8,
    /// Keep ids even when nothing references them.
    pub keep_ids: bool,
    pub remove_metadata: bool,
    pub remove_comments: bool,
    pub collapse_groups: bool,
    pub remove_default_attributes: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            precision: 3,
            keep_ids: false,
            remove_metadata: true,
            remove_comments: true,
            collapse_groups: true,
            remove_default_attributes: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimized {
    pub content: String,
    pub original_size: usize,
    pub optimized_size: usize,
}

impl Optimized {
    /// Bytes saved as a percentage of the original size.
    pub fn savings_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        let saved = self.original_size.saturating_sub(self.optimized_size);
        saved as f64 * 100.0 / self.original_size as f64
    }
}

/// Optimizes SVG text. Text that does not parse is returned unchanged.
pub fn optimize(text: &str, options: &OptimizeOptions) -> Optimized {
    let original_size = text.len();
    let mut tree = match svg::parse(text) {
        Ok(tree) => tree,
        Err(err) => {
            log::warn!("Skipping optimization of unparseable SVG: {}", err);
            return Optimized {
                content: text.to_owned(),
                original_size,
                optimized_size: original_size,
            };
        }
    };

    optimize_tree(&mut tree, options);
    let content = svg::serialize(&tree);
    log::info!("Optimized SVG from {} to {} bytes", original_size, content.len());
    Optimized {
        optimized_size: content.len(),
        content,
        original_size,
    }
}

/// Runs every enabled pass over `tree` in place.
pub fn optimize_tree(tree: &mut SvgTree, options: &OptimizeOptions) {
    tree.declaration = None;
    if options.remove_comments {
        tree.prolog.retain(|node| matches!(node, Node::Doctype(_)));
        tree.epilog.clear();
    }

    let root = &mut tree.root;
    prune_nodes(root, options);
    round_numbers(root, options.precision);
    let keep_xlink = uses_xlink(root);
    remove_redundant_attributes(root, keep_xlink);
    if !options.keep_ids {
        let referenced = referenced_ids(root);
        remove_unreferenced_ids(root, &referenced);
    }
    if options.collapse_groups {
        collapse_groups(root);
    }
    if options.remove_default_attributes {
        remove_default_attributes(root);
    }
    collapse_attribute_whitespace(root);
}

fn prune_nodes(element: &mut Element, options: &OptimizeOptions) {
    element.children.retain(|child| match child {
        Node::Text(text) => !text.trim().is_empty(),
        Node::Comment(_) | Node::ProcessingInstruction(_) => !options.remove_comments,
        Node::Element(child) => !(options.remove_metadata && child.tag() == "metadata"),
        _ => true,
    });
    for child in element.children.iter_mut().filter_map(Node::as_element_mut) {
        prune_nodes(child, options);
    }
}

fn for_each_element(element: &mut Element, f: &mut impl FnMut(&mut Element)) {
    f(element);
    for child in element.children.iter_mut().filter_map(Node::as_element_mut) {
        for_each_element(child, f);
    }
}

fn round_numbers(root: &mut Element, precision: u8) {
    for_each_element(root, &mut |element| {
        for attribute in &mut element.attributes {
            if !NON_NUMERIC_ATTRIBUTES.contains(&attribute.name.as_str()) {
                attribute.value = round_decimals(&attribute.value, precision);
            }
        }
    });
}

/// Rounds every decimal number in `value` (`1.23456`, `.123456`) to
/// `precision` places and drops trailing zeros. A fraction written without
/// a leading zero keeps that short form. Integers and exponents are left alone.
pub fn round_decimals(value: &str, precision: u8) -> String {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut index = 0;
    while index < bytes.len() {
        let start = index;
        while index < bytes.len() && bytes[index].is_ascii_digit() {
            index += 1;
        }
        let has_fraction = index + 1 < bytes.len() && bytes[index] == b'.' && bytes[index + 1].is_ascii_digit();
        if !has_fraction {
            if index == start {
                // Not a number; copy one character through.
                let c = value[index..].chars().next().unwrap_or_default();
                out.push(c);
                index += c.len_utf8();
            } else {
                out.push_str(&value[start..index]);
            }
            continue;
        }
        index += 1;
        while index < bytes.len() && bytes[index].is_ascii_digit() {
            index += 1;
        }
        let number = &value[start..index];
        match number.parse::<f64>() {
            Ok(parsed) => {
                let rounded = format_rounded(parsed, precision);
                match rounded.strip_prefix("0.") {
                    Some(fraction) if number.starts_with('.') => {
                        out.push('.');
                        out.push_str(fraction);
                    }
                    _ => out.push_str(&rounded),
                }
            }
            Err(_) => out.push_str(number),
        }
    }
    out
}

fn format_rounded(value: f64, precision: u8) -> String {
    let mut text = format!("{:.*}", usize::from(precision), value);
    if text.contains('.') {
        text.truncate(text.trim_end_matches('0').trim_end_matches('.').len());
    }
    text
}

fn uses_xlink(root: &Element) -> bool {
    let mut stack = vec![root];
    while let Some(element) = stack.pop() {
        if element.attributes.iter().any(|attribute| attribute.name.starts_with("xlink:")) {
            return true;
        }
        stack.extend(element.children.iter().filter_map(Node::as_element));
    }
    false
}

fn remove_redundant_attributes(root: &mut Element, keep_xlink: bool) {
    for_each_element(root, &mut |element| {
        element
            .attributes
            .retain(|attribute| !REDUNDANT_ATTRIBUTES.contains(&attribute.name.as_str()));
        if !keep_xlink {
            element.remove_attr("xmlns:xlink");
        }
    });
}

/// Ids referenced through `url(#id)` or an `href="#id"`.
fn referenced_ids(root: &Element) -> HashSet<String> {
    let mut ids = HashSet::new();
    let mut stack = vec![root];
    while let Some(element) = stack.pop() {
        for attribute in &element.attributes {
            let value = attribute.value.as_str();
            if attribute.name == "href" || attribute.name == "xlink:href" {
                if let Some(id) = value.trim().strip_prefix('#') {
                    ids.insert(id.to_owned());
                }
            }
            let mut rest = value;
            while let Some(start) = rest.find("url(#") {
                rest = &rest[start + "url(#".len()..];
                let Some(end) = rest.find(')') else {
                    break;
                };
                ids.insert(rest[..end].trim().to_owned());
                rest = &rest[end..];
            }
        }
        stack.extend(element.children.iter().filter_map(Node::as_element));
    }
    ids
}

fn remove_unreferenced_ids(root: &mut Element, referenced: &HashSet<String>) {
    for_each_element(root, &mut |element| {
        if element.attr("id").is_some_and(|id| !referenced.contains(id)) {
            element.remove_attr("id");
        }
    });
}

/// Inlines attribute-less groups with a single child and drops empty groups.
fn collapse_groups(element: &mut Element) {
    for child in element.children.iter_mut().filter_map(Node::as_element_mut) {
        collapse_groups(child);
    }
    let children = std::mem::take(&mut element.children);
    for child in children {
        match child {
            Node::Element(group) if group.tag() == "g" => {
                if group.child_element_count() == 0 {
                    continue;
                }
                if group.attributes.is_empty() && group.children.len() == 1 {
                    element.children.extend(group.children);
                } else {
                    element.children.push(Node::Element(group));
                }
            }
            other => element.children.push(other),
        }
    }
}

fn remove_default_attributes(root: &mut Element) {
    for_each_element(root, &mut |element| {
        element.attributes.retain(|attribute| {
            !DEFAULT_VALUES
                .iter()
                .any(|(name, value)| attribute.name == *name && attribute.value == *value)
        });
    });
}

fn collapse_attribute_whitespace(root: &mut Element) {
    for_each_element(root, &mut |element| {
        for attribute in &mut element.attributes {
            if attribute.value.contains(char::is_whitespace) {
                attribute.value = attribute.value.split_whitespace().collect::<Vec<_>>().join(" ");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> String {
        optimize(text, &OptimizeOptions::default()).content
    }

    #[test]
    fn test_round_decimals() {
        assert_eq!(round_decimals("M1.23456 .5L10 0.1000", 3), "M1.235 .5L10 0.1");
        assert_eq!(round_decimals("M.123456-.9999", 3), "M.123-1");
        assert_eq!(round_decimals("translate(2.0004,3)", 3), "translate(2,3)");
        assert_eq!(round_decimals("1e-5", 3), "1e-5");
    }

    #[test]
    fn test_strips_comments_metadata_and_whitespace() {
        let text = "<?xml version=\"1.0\"?>\n<!-- c -->\n<svg version=\"1.1\">\n  <metadata>m</metadata>\n  <!-- inner -->\n  <rect width=\"10.12345\" stroke-width=\"1\"/>\n</svg>";
        assert_eq!(run(text), r#"<svg><rect width="10.123"/></svg>"#);
    }

    #[test]
    fn test_keeps_referenced_ids() {
        let text = r##"<svg><linearGradient id="g1"/><rect id="r" fill="url(#g1)"/><use href="#r"/><circle id="unused"/></svg>"##;
        assert_eq!(
            run(text),
            r##"<svg><linearGradient id="g1"/><rect id="r" fill="url(#g1)"/><use href="#r"/><circle/></svg>"##
        );
        let kept = optimize(
            text,
            &OptimizeOptions {
                keep_ids: true,
                ..OptimizeOptions::default()
            },
        );
        assert!(kept.content.contains(r#"id="unused""#));
    }

    #[test]
    fn test_collapses_groups() {
        let text = r#"<svg><g><rect/></g><g fill="red"><circle/></g><g></g><g><g/></g></svg>"#;
        assert_eq!(run(text), r#"<svg><rect/><g fill="red"><circle/></g></svg>"#);
    }

    #[test]
    fn test_xlink_namespace_kept_when_used() {
        let used = r##"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/></svg>"##;
        assert!(run(used).contains("xmlns:xlink"));
        let unused = r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><rect/></svg>"#;
        assert_eq!(run(unused), "<svg><rect/></svg>");
    }

    #[test]
    fn test_invalid_input_is_returned_unchanged() {
        let result = optimize("<svg><g></svg>", &OptimizeOptions::default());
        assert_eq!(result.content, "<svg><g></svg>");
        assert_eq!(result.original_size, result.optimized_size);
        assert_eq!(result.savings_percent(), 0.0);
    }
}
