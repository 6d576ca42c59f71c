use eframe::egui;

/// An SVG file read from a drop, ready to be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub name: String,
    pub text: String,
}

/// Collects SVG files dropped onto the window.
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up files dropped this frame. Returns true if there were any.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if i.raw.dropped_files.is_empty() {
                false
            } else {
                self.dropped_files = i.raw.dropped_files.clone();
                true
            }
        })
    }

    /// Reads the queued files. Anything that is not readable SVG text is
    /// logged and skipped.
    pub fn take_svg_files(&mut self) -> Vec<LoadedFile> {
        std::mem::take(&mut self.dropped_files)
            .iter()
            .filter_map(read_dropped_file)
            .collect()
    }

    /// Dims the window while files are dragged over it.
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }
        let text = ctx.input(|i| {
            let mut text = "Drop SVG files to open:\n".to_owned();
            for file in &i.raw.hovered_files {
                match &file.path {
                    Some(path) => text += &format!("\n{}", path.display()),
                    None => text += "\n(path not available)",
                }
            }
            text
        });

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(name) = file.path.as_ref().and_then(|path| path.file_name()) {
        name.to_string_lossy().into_owned()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "untitled.svg".to_owned()
    }
}

fn read_dropped_file(file: &egui::DroppedFile) -> Option<LoadedFile> {
    let name = display_name(file);
    if !is_svg_file(&name, &file.mime) {
        log::warn!("Dropped file is not an SVG: {}", name);
        return None;
    }
    let bytes = match (&file.bytes, &file.path) {
        (Some(bytes), _) => bytes.to_vec(),
        #[cfg(not(target_arch = "wasm32"))]
        (None, Some(path)) => match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("Failed to read {}: {}", path.display(), err);
                return None;
            }
        },
        _ => {
            log::warn!("Dropped file has no accessible data: {}", name);
            return None;
        }
    };
    match decode_svg_text(&bytes) {
        Some(text) => {
            log::info!("Loaded {} ({} bytes)", name, bytes.len());
            Some(LoadedFile { name, text })
        }
        None => {
            log::error!("{} is not UTF-8 text", name);
            None
        }
    }
}

/// True for an `image/svg+xml` MIME type or an `.svg` extension.
pub fn is_svg_file(name: &str, mime: &str) -> bool {
    if !mime.is_empty() {
        return mime.starts_with("image/svg");
    }
    std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Decodes file bytes as UTF-8, dropping a byte order mark.
pub fn decode_svg_text(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_svg_file() {
        assert!(is_svg_file("logo.svg", ""));
        assert!(is_svg_file("LOGO.SVG", ""));
        assert!(is_svg_file("whatever", "image/svg+xml"));
        assert!(!is_svg_file("photo.png", ""));
        assert!(!is_svg_file("logo.svg", "image/png"));
    }

    #[test]
    fn test_decode_strips_bom() {
        assert_eq!(decode_svg_text(b"\xEF\xBB\xBF<svg/>"), Some("<svg/>".to_owned()));
        assert_eq!(decode_svg_text(&[0xff, 0xfe]), None);
    }
}
