//! Owned SVG/XML tree with a parser and serializer.
//!
//! The tree is a plain value: editing replaces or mutates it in place, and
//! anything that must survive a tree replacement (history, selection) keeps
//! serialized text or a [`NodePath`] rather than references into it.

mod parser;
mod path;
mod serializer;
mod tree;

use std::cell::RefCell;
use std::rc::Rc;

pub use parser::parse;
pub use path::NodePath;
pub use serializer::{format_svg, serialize, serialize_element, serialize_pretty};
pub use tree::{Attribute, Element, Node, SvgTree};

/// Shared handle to the live tree of one open document.
///
/// A new handle is created whenever the document is reparsed, so two node
/// references only point at the same node if they share the same handle.
pub type TreeHandle = Rc<RefCell<SvgTree>>;

/// Wraps a tree in a fresh handle.
pub fn new_handle(tree: SvgTree) -> TreeHandle {
    Rc::new(RefCell::new(tree))
}

/// Formats a number for an attribute value without trailing zeros.
///
/// `12.0` becomes `"12"`, `0.5000` becomes `"0.5"`, `-0.0` becomes `"0"`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_owned();
    }
    let mut text = format!("{:.3}", value);
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" { "0".to_owned() } else { text }
}

/// Parses a length such as `"120px"` or `" 3.5e1 "`, ignoring the unit.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|&(index, c)| {
            !(c.is_ascii_digit()
                || c == '.'
                || ((c == '-' || c == '+') && (index == 0 || value[..index].ends_with(['e', 'E'])))
                || ((c == 'e' || c == 'E') && index > 0))
        })
        .map_or(value.len(), |(index, _)| index);
    let number = &value[..end];
    number
        .parse::<f64>()
        .ok()
        .or_else(|| number.trim_end_matches(['e', 'E']).parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(1.23456), "1.235");
        assert_eq!(format_number(-0.0001), "0");
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("120px"), Some(120.0));
        assert_eq!(parse_length(" 3.5 "), Some(3.5));
        assert_eq!(parse_length("100%"), Some(100.0));
        assert_eq!(parse_length("1e2mm"), Some(100.0));
        assert_eq!(parse_length("auto"), None);
    }
}
