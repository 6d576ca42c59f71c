use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fmt::Display;

use super::{Attribute, Element, Node, SvgTree};
use crate::error::ParseError;

/// Parses SVG text into an owned tree.
///
/// Any XML error, unclosed element, stray top-level text, missing or
/// duplicated root, or a root other than `<svg>` is reported as a
/// [`ParseError`]; nothing is returned in that case.
pub fn parse(text: &str) -> Result<SvgTree, ParseError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = true;

    let mut declaration = None;
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut root: Option<Element> = None;
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|err| xml_error(position, err))?;
        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(ParseError::MultipleRoots);
                }
                stack.push(element_from_start(&start, position)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start, position)?;
                attach(Node::Element(element), &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| ParseError::Xml {
                    position,
                    message: "closing tag without a matching opening tag".to_owned(),
                })?;
                attach(Node::Element(element), &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|err| xml_error(position, err))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Text(value.into_owned())),
                    None if value.trim().is_empty() => {}
                    None => return Err(ParseError::TextOutsideRoot),
                }
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(&data).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::CData(value)),
                    None => return Err(ParseError::TextOutsideRoot),
                }
            }
            Event::Comment(comment) => {
                let node = Node::Comment(String::from_utf8_lossy(&comment).into_owned());
                push_misc(node, &mut stack, &root, &mut prolog, &mut epilog);
            }
            Event::PI(instruction) => {
                let node = Node::ProcessingInstruction(String::from_utf8_lossy(&instruction).into_owned());
                push_misc(node, &mut stack, &root, &mut prolog, &mut epilog);
            }
            Event::Decl(decl) => {
                declaration = Some(String::from_utf8_lossy(&decl).trim().to_owned());
            }
            Event::DocType(doctype) => {
                if root.is_some() || !stack.is_empty() {
                    return Err(ParseError::Xml {
                        position,
                        message: "doctype after the root element".to_owned(),
                    });
                }
                prolog.push(Node::Doctype(String::from_utf8_lossy(&doctype).trim().to_owned()));
            }
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Unclosed(open.name.clone()));
    }
    let root = root.ok_or(ParseError::MissingRoot)?;
    if !root.tag().eq_ignore_ascii_case("svg") {
        return Err(ParseError::NotSvg(root.name));
    }

    Ok(SvgTree {
        declaration,
        prolog,
        root,
        epilog,
    })
}

fn xml_error(position: u64, err: impl Display) -> ParseError {
    ParseError::Xml {
        position,
        message: err.to_string(),
    }
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<Element, ParseError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| xml_error(position, err))?;
        let name = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| xml_error(position, err))?
            .into_owned();
        element.attributes.push(Attribute { name, value });
    }
    Ok(element)
}

fn attach(node: Node, stack: &mut [Element], root: &mut Option<Element>) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::MultipleRoots);
    }
    if let Node::Element(element) = node {
        *root = Some(element);
    }
    Ok(())
}

fn push_misc(
    node: Node,
    stack: &mut [Element],
    root: &Option<Element>,
    prolog: &mut Vec<Node>,
    epilog: &mut Vec<Node>,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => prolog.push(node),
        None => epilog.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_document() {
        let tree = parse(r#"<?xml version="1.0"?><svg width="10"><rect id="a"/><g><circle r="2"/></g></svg>"#)
            .unwrap();
        assert_eq!(tree.declaration.as_deref(), Some(r#"xml version="1.0""#));
        assert_eq!(tree.root.attr("width"), Some("10"));
        assert_eq!(tree.root.child_element_count(), 2);
    }

    #[test]
    fn test_parse_unescapes_text_and_attributes() {
        let tree = parse(r#"<svg><text title="a &amp; b">1 &lt; 2</text></svg>"#).unwrap();
        let text = tree.root.children[0].as_element().unwrap();
        assert_eq!(text.attr("title"), Some("a & b"));
        assert_eq!(text.text_content(), "1 < 2");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("<svg><rect></svg>"), Err(ParseError::Xml { .. })));
        assert!(matches!(parse("<svg><rect>"), Err(ParseError::Unclosed(_))));
        assert!(matches!(parse(""), Err(ParseError::MissingRoot)));
        assert!(matches!(parse("<svg/><svg/>"), Err(ParseError::MultipleRoots)));
        assert!(matches!(parse("hello <svg/>"), Err(ParseError::TextOutsideRoot)));
        assert!(matches!(parse("<html/>"), Err(ParseError::NotSvg(_))));
    }

    #[test]
    fn test_comments_around_root() {
        let tree = parse("<!-- before --><svg/><!-- after -->").unwrap();
        assert_eq!(tree.prolog, vec![Node::Comment(" before ".into())]);
        assert_eq!(tree.epilog, vec![Node::Comment(" after ".into())]);
    }
}
