use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::svg::{self, Element, Node};

const SVG_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n",
    "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" ",
    "\"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Png,
    Jpeg,
    Webp,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Svg,
        ExportFormat::Png,
        ExportFormat::Jpeg,
        ExportFormat::Webp,
        ExportFormat::Pdf,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Webp => "webp",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn is_raster(self) -> bool {
        matches!(self, ExportFormat::Png | ExportFormat::Jpeg | ExportFormat::Webp)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub scale: f32,
    /// Fill behind the drawing; `None` keeps it transparent.
    pub background: Option<String>,
    /// Encoder quality in `(0, 1]` for lossy formats.
    pub quality: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Svg,
            scale: 1.0,
            background: None,
            quality: 0.9,
        }
    }
}

impl ExportOptions {
    /// Background to paint. JPEG has no alpha, so it falls back to white.
    pub fn effective_background(&self) -> Option<&str> {
        match (&self.background, self.format) {
            (Some(color), _) => Some(color.as_str()),
            (None, ExportFormat::Jpeg) => Some("#ffffff"),
            (None, _) => None,
        }
    }
}

/// Everything an exporter needs to produce one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub content: String,
    pub format: ExportFormat,
    pub scale: f32,
    pub background: Option<String>,
    pub quality: f32,
    pub file_name: String,
}

impl ExportRequest {
    pub fn new(content: &str, document_name: &str, options: &ExportOptions) -> Self {
        Self {
            content: content.to_owned(),
            format: options.format,
            scale: options.scale,
            background: options.effective_background().map(str::to_owned),
            quality: options.quality,
            file_name: export_file_name(document_name, options.format),
        }
    }
}

/// A finished export, ready to be saved or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    #[error("{0} export is not supported")]
    Unsupported(ExportFormat),

    #[error("scale {0} must be positive")]
    InvalidScale(f32),

    #[error("content is not valid SVG: {0}")]
    InvalidContent(String),

    #[error("{0}")]
    Failed(String),
}

/// Turns SVG text into file bytes of some format.
pub trait Exporter {
    fn supports(&self, format: ExportFormat) -> bool;

    fn export(&self, request: &ExportRequest) -> Result<Vec<u8>, ExportError>;
}

/// Writes standalone SVG files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgExporter;

impl Exporter for SvgExporter {
    fn supports(&self, format: ExportFormat) -> bool {
        format == ExportFormat::Svg
    }

    fn export(&self, request: &ExportRequest) -> Result<Vec<u8>, ExportError> {
        if !self.supports(request.format) {
            return Err(ExportError::Unsupported(request.format));
        }
        let mut tree =
            svg::parse(&request.content).map_err(|err| ExportError::InvalidContent(err.to_string()))?;
        if let Some(color) = &request.background {
            let backdrop = Element::new("rect")
                .with_attr("width", "100%")
                .with_attr("height", "100%")
                .with_attr("fill", color);
            tree.root.children.insert(0, Node::Element(backdrop));
        }
        let mut out = String::from(SVG_HEADER);
        out.push_str(&svg::serialize_element(&tree.root));
        Ok(out.into_bytes())
    }
}

/// Runs `request` through `exporter` after checking the shared options.
pub fn run_export(exporter: &dyn Exporter, request: &ExportRequest) -> Result<ExportedFile, ExportError> {
    if !(request.scale > 0.0 && request.scale.is_finite()) {
        return Err(ExportError::InvalidScale(request.scale));
    }
    if !exporter.supports(request.format) {
        return Err(ExportError::Unsupported(request.format));
    }
    let bytes = exporter.export(request)?;
    log::info!("Exported {} ({} bytes)", request.file_name, bytes.len());
    Ok(ExportedFile {
        file_name: request.file_name.clone(),
        format: request.format,
        bytes,
    })
}

/// `drawing.svg` becomes `drawing.png`; a blank name becomes `image.png`.
pub fn export_file_name(document_name: &str, format: ExportFormat) -> String {
    let name = document_name.trim();
    let stem = match name.len().checked_sub(4) {
        Some(split) if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(".svg") => &name[..split],
        _ => name,
    };
    let stem = if stem.is_empty() { "image" } else { stem };
    format!("{}.{}", stem, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(format: ExportFormat, background: Option<&str>) -> ExportRequest {
        ExportRequest {
            content: r#"<?xml version="1.0"?><svg width="4"><rect/></svg>"#.to_owned(),
            format,
            scale: 1.0,
            background: background.map(str::to_owned),
            quality: 0.9,
            file_name: "a.svg".to_owned(),
        }
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("drawing.svg", ExportFormat::Png), "drawing.png");
        assert_eq!(export_file_name("Logo.SVG", ExportFormat::Pdf), "Logo.pdf");
        assert_eq!(export_file_name("notes.txt", ExportFormat::Svg), "notes.txt.svg");
        assert_eq!(export_file_name(".svg", ExportFormat::Jpeg), "image.jpeg");
        assert_eq!(export_file_name("", ExportFormat::Svg), "image.svg");
    }

    #[test]
    fn test_svg_export_adds_header_and_background() {
        let bytes = SvgExporter.export(&request(ExportFormat::Svg, Some("#000"))).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(SVG_HEADER));
        assert!(text.ends_with(r##"<svg width="4"><rect width="100%" height="100%" fill="#000"/><rect/></svg>"##));
    }

    #[test]
    fn test_raster_formats_are_unsupported() {
        assert_eq!(
            run_export(&SvgExporter, &request(ExportFormat::Png, None)),
            Err(ExportError::Unsupported(ExportFormat::Png))
        );
    }

    #[test]
    fn test_jpeg_defaults_to_white_background() {
        let options = ExportOptions {
            format: ExportFormat::Jpeg,
            ..ExportOptions::default()
        };
        assert_eq!(options.effective_background(), Some("#ffffff"));
        assert_eq!(ExportOptions::default().effective_background(), None);
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        let mut bad = request(ExportFormat::Svg, None);
        bad.scale = 0.0;
        assert_eq!(run_export(&SvgExporter, &bad), Err(ExportError::InvalidScale(0.0)));
    }
}
