use serde::{Deserialize, Serialize};

use crate::svg::Element;

/// Shape-specific attributes shown in the property panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Geometry {
    Rect {
        x: String,
        y: String,
        width: String,
        height: String,
        rx: String,
        ry: String,
    },
    Circle {
        cx: String,
        cy: String,
        r: String,
    },
    Ellipse {
        cx: String,
        cy: String,
        rx: String,
        ry: String,
    },
    Line {
        x1: String,
        y1: String,
        x2: String,
        y2: String,
    },
    /// `polyline` and `polygon`.
    Points { points: String },
    Path { d: String },
    Text {
        x: String,
        y: String,
        text: String,
        font_family: String,
        font_size: String,
    },
    None,
}

/// Attribute summary of a selected element, with editor defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub tag: String,
    pub id: String,
    pub class: String,
    pub fill: String,
    pub fill_opacity: String,
    pub stroke: String,
    pub stroke_width: String,
    pub stroke_opacity: String,
    pub transform: String,
    pub geometry: Geometry,
}

fn attr_or(element: &Element, name: &str, default: &str) -> String {
    element.attr(name).unwrap_or(default).to_owned()
}

impl ElementInfo {
    pub fn from_element(element: &Element) -> Self {
        let num = |name: &str| attr_or(element, name, "0");
        let tag = element.tag();
        let geometry = match tag.as_str() {
            "rect" => Geometry::Rect {
                x: num("x"),
                y: num("y"),
                width: num("width"),
                height: num("height"),
                rx: num("rx"),
                ry: num("ry"),
            },
            "circle" => Geometry::Circle {
                cx: num("cx"),
                cy: num("cy"),
                r: num("r"),
            },
            "ellipse" => Geometry::Ellipse {
                cx: num("cx"),
                cy: num("cy"),
                rx: num("rx"),
                ry: num("ry"),
            },
            "line" => Geometry::Line {
                x1: num("x1"),
                y1: num("y1"),
                x2: num("x2"),
                y2: num("y2"),
            },
            "polyline" | "polygon" => Geometry::Points {
                points: attr_or(element, "points", ""),
            },
            "path" => Geometry::Path {
                d: attr_or(element, "d", ""),
            },
            "text" => Geometry::Text {
                x: num("x"),
                y: num("y"),
                text: element.text_content(),
                font_family: attr_or(element, "font-family", "sans-serif"),
                font_size: attr_or(element, "font-size", "16"),
            },
            _ => Geometry::None,
        };
        Self {
            id: attr_or(element, "id", ""),
            class: attr_or(element, "class", ""),
            fill: attr_or(element, "fill", "none"),
            fill_opacity: attr_or(element, "fill-opacity", "1"),
            stroke: attr_or(element, "stroke", "none"),
            stroke_width: attr_or(element, "stroke-width", "1"),
            stroke_opacity: attr_or(element, "stroke-opacity", "1"),
            transform: attr_or(element, "transform", ""),
            tag,
            geometry,
        }
    }

    /// Short label such as `rect #logo`.
    pub fn label(&self) -> String {
        if self.id.is_empty() {
            self.tag.clone()
        } else {
            format!("{} #{}", self.tag, self.id)
        }
    }

    /// Editable geometry fields as `(attribute, value)` pairs.
    ///
    /// Text content is reported under the pseudo attribute `textContent`.
    pub fn geometry_fields(&self) -> Vec<(&'static str, &str)> {
        match &self.geometry {
            Geometry::Rect {
                x,
                y,
                width,
                height,
                rx,
                ry,
            } => vec![
                ("x", x),
                ("y", y),
                ("width", width),
                ("height", height),
                ("rx", rx),
                ("ry", ry),
            ],
            Geometry::Circle { cx, cy, r } => vec![("cx", cx), ("cy", cy), ("r", r)],
            Geometry::Ellipse { cx, cy, rx, ry } => vec![("cx", cx), ("cy", cy), ("rx", rx), ("ry", ry)],
            Geometry::Line { x1, y1, x2, y2 } => vec![("x1", x1), ("y1", y1), ("x2", x2), ("y2", y2)],
            Geometry::Points { points } => vec![("points", points)],
            Geometry::Path { d } => vec![("d", d)],
            Geometry::Text {
                x,
                y,
                text,
                font_family,
                font_size,
            } => vec![
                ("x", x),
                ("y", y),
                ("textContent", text),
                ("font-family", font_family),
                ("font-size", font_size),
            ],
            Geometry::None => Vec::new(),
        }
        .into_iter()
        .map(|(name, value)| (name, value.as_str()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::Node;

    #[test]
    fn test_defaults_for_bare_rect() {
        let info = ElementInfo::from_element(&Element::new("rect").with_attr("width", "5"));
        assert_eq!(info.fill, "none");
        assert_eq!(info.stroke_width, "1");
        assert_eq!(
            info.geometry,
            Geometry::Rect {
                x: "0".into(),
                y: "0".into(),
                width: "5".into(),
                height: "0".into(),
                rx: "0".into(),
                ry: "0".into(),
            }
        );
    }

    #[test]
    fn test_text_fields() {
        let text = Element::new("text").with_child(Node::Text("Hello".into()));
        let info = ElementInfo::from_element(&text);
        let fields = info.geometry_fields();
        assert!(fields.contains(&("textContent", "Hello")));
        assert!(fields.contains(&("font-family", "sans-serif")));
        assert!(fields.contains(&("font-size", "16")));
    }
}
