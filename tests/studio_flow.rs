use eframe::egui::{Rect, pos2};
use std::cell::RefCell;
use std::rc::Rc;
use svg_studio::error::EditorError;
use svg_studio::event::{EditorEvent, Topic};
use svg_studio::export::{ExportError, ExportFormat, ExportOptions, SvgExporter};
use svg_studio::layer::LayerId;
use svg_studio::svg::NodePath;
use svg_studio::tools::InteractiveMode;
use svg_studio::Studio;

const SVG: &str = r#"<svg><rect id="a" width="10"/><circle r="5"/><path d="M0 0"/></svg>"#;

fn layer_ids(studio: &Studio) -> Vec<String> {
    studio
        .layers()
        .layers()
        .iter()
        .map(|layer| layer.id.to_string())
        .collect()
}

fn active_content(studio: &Studio) -> String {
    studio
        .documents()
        .active()
        .map(|document| document.content().to_owned())
        .unwrap_or_default()
}

fn error_titles(studio: &Studio) -> Rc<RefCell<Vec<String>>> {
    let titles = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&titles);
    studio.event_bus().subscribe(Topic::Error, move |event| {
        if let EditorEvent::Error(report) = event {
            sink.borrow_mut().push(report.title.clone());
        }
    });
    titles
}

#[test]
fn test_edit_and_undo_round_trip() {
    let studio = Studio::default();
    let id = studio.import_document("shapes.svg", SVG).unwrap();
    assert_eq!(layer_ids(&studio), vec!["a", "layer_1", "layer_2"]);

    studio.select_node(NodePath::from_indices(vec![1])).unwrap();
    assert_eq!(studio.highlighted_layer(), Some(LayerId::new("layer_1")));
    studio.deselect();
    assert_eq!(studio.highlighted_layer(), None);

    let rect = studio.layers().node_for(&LayerId::new("a")).unwrap();
    studio.set_attribute(&rect, "fill", "#ff0000").unwrap();
    assert!(active_content(&studio).contains(r##"fill="#ff0000""##));
    {
        let history = studio.history();
        assert_eq!(history.len(id), 2);
        assert_eq!(history.cursor(id), Some(1));
        assert_eq!(history.entries(id)[1].description, "change fill");
    }

    assert_eq!(studio.undo(), Ok(true));
    assert_eq!(active_content(&studio), SVG);
    assert_eq!(layer_ids(&studio), vec!["a", "layer_1", "layer_2"]);
    assert!(studio.history_status().can_redo);

    assert_eq!(studio.redo(), Ok(true));
    assert!(active_content(&studio).contains("#ff0000"));
}

#[test]
fn test_selection_follows_undo() {
    let studio = Studio::default();
    studio.import_document("shapes.svg", SVG).unwrap();
    let circle = studio.layers().node_for(&LayerId::new("layer_1")).unwrap();
    studio.select_node(circle.path().clone()).unwrap();
    studio.set_attribute(&circle, "r", "8").unwrap();

    studio.undo().unwrap();
    let selected = studio.selected_node().unwrap();
    assert_eq!(selected.path(), &NodePath::from_indices(vec![1]));
    assert_eq!(selected.with_element(|element| element.attr("r").map(str::to_owned)), Some(Some("5".to_owned())));
}

#[test]
fn test_crop_blocks_measure_until_finished() {
    let studio = Studio::default();
    let errors = error_titles(&studio);
    studio.import_document("shapes.svg", SVG).unwrap();

    studio.start_crop().unwrap();
    assert!(matches!(
        studio.toggle_measure(),
        Err(EditorError::ToolConflict {
            active: InteractiveMode::Crop,
            requested: InteractiveMode::Measure,
        })
    ));
    assert_eq!(studio.tools().active_mode(), Some(InteractiveMode::Crop));
    assert_eq!(*errors.borrow(), vec!["Tool conflict"]);

    studio.set_crop_region(Rect::from_min_max(pos2(0.0, 0.0), pos2(5.0, 8.0)));
    let region = studio.apply_crop().unwrap();
    assert_eq!(region.width(), 5.0);
    assert!(active_content(&studio).contains(r#"viewBox="0 0 5 8""#));
    assert_eq!(studio.tools().active_mode(), None);

    assert_eq!(studio.toggle_measure(), Ok(true));
    assert!(studio.measure(pos2(0.0, 0.0), pos2(3.0, 4.0)).is_some());
    assert_eq!(studio.toggle_measure(), Ok(false));
    assert!(studio.measure(pos2(0.0, 0.0), pos2(3.0, 4.0)).is_none());
}

#[test]
fn test_crop_needs_a_document() {
    let studio = Studio::default();
    assert_eq!(studio.start_crop(), Err(EditorError::NothingToCrop));
    assert_eq!(studio.tools().active_mode(), None);
}

#[test]
fn test_cancelled_crop_leaves_document_alone() {
    let studio = Studio::default();
    let id = studio.import_document("shapes.svg", SVG).unwrap();
    studio.start_crop().unwrap();
    studio.set_crop_region(Rect::from_min_max(pos2(0.0, 0.0), pos2(5.0, 5.0)));
    studio.cancel_crop();

    assert_eq!(active_content(&studio), SVG);
    assert_eq!(studio.history().len(id), 1);
    assert_eq!(studio.apply_crop(), Err(EditorError::NothingToCrop));
}

#[test]
fn test_code_edits_apply_only_when_valid() {
    let studio = Studio::default();
    let id = studio.import_document("shapes.svg", SVG).unwrap();

    studio.code_view_mut().set_text("<svg>");
    assert!(matches!(studio.apply_code(), Err(EditorError::Parse(_))));
    assert_eq!(active_content(&studio), SVG);
    assert_eq!(studio.code_view().text(), "<svg>");
    assert_eq!(studio.history().len(id), 1);

    let replacement = r#"<svg><circle r="1"/></svg>"#;
    studio.code_view_mut().set_text(replacement);
    studio.apply_code().unwrap();
    assert_eq!(active_content(&studio), replacement);
    assert_eq!(layer_ids(&studio), vec!["layer_0"]);
    assert!(!studio.code_view().is_modified());
    assert_eq!(studio.history().entries(id)[1].description, "edit SVG code");
}

#[test]
fn test_optimize_replaces_content_and_records_snapshot() {
    let studio = Studio::default();
    let text = r#"<?xml version="1.0"?><svg><!-- note --><metadata>x</metadata><rect width="10.123456"/></svg>"#;
    let id = studio.import_document("busy.svg", text).unwrap();

    let optimized = studio.optimize_active().unwrap();
    assert!(optimized.optimized_size < optimized.original_size);
    let content = active_content(&studio);
    assert!(!content.contains("<!--"));
    assert!(!content.contains("metadata"));
    assert!(content.contains(r#"width="10.123""#));
    assert_eq!(studio.history().entries(id)[1].description, "optimize SVG");
}

#[test]
fn test_export_leaves_document_unchanged() {
    let studio = Studio::default();
    studio.import_document("shapes.svg", SVG).unwrap();

    let exported = studio
        .export_active(&SvgExporter, &ExportOptions::default())
        .unwrap();
    assert_eq!(exported.file_name, "shapes.svg");
    assert_eq!(exported.format, ExportFormat::Svg);
    assert!(String::from_utf8(exported.bytes).unwrap().starts_with("<?xml"));
    assert_eq!(active_content(&studio), SVG);
}

#[test]
fn test_batch_export_reports_each_failure() {
    let studio = Studio::default();
    let errors = error_titles(&studio);
    studio.import_document("one.svg", SVG).unwrap();
    studio.import_document("two.svg", SVG).unwrap();

    let png = ExportOptions {
        format: ExportFormat::Png,
        ..ExportOptions::default()
    };
    let results = studio.export_all(&SvgExporter, &png);
    assert_eq!(results.len(), 2);
    for result in results {
        assert_eq!(
            result,
            Err(EditorError::Export(ExportError::Unsupported(ExportFormat::Png)))
        );
    }
    assert_eq!(errors.borrow().len(), 2);

    let names: Vec<String> = studio
        .export_all(&SvgExporter, &ExportOptions::default())
        .into_iter()
        .map(|result| result.unwrap().file_name)
        .collect();
    assert_eq!(names, vec!["one.svg", "two.svg"]);
}

#[test]
fn test_closing_documents_moves_focus_and_drops_history() {
    let studio = Studio::default();
    let first = studio.import_document("one.svg", SVG).unwrap();
    let second = studio.import_document("two.svg", r#"<svg><circle/></svg>"#).unwrap();
    assert_eq!(studio.active_document(), Some(second));
    assert_eq!(studio.layers().len(), 1);

    studio.close_document(second).unwrap();
    assert_eq!(studio.active_document(), Some(first));
    assert_eq!(studio.history().len(second), 0);
    assert_eq!(layer_ids(&studio), vec!["a", "layer_1", "layer_2"]);

    studio.close_document(first).unwrap();
    assert_eq!(studio.active_document(), None);
    assert!(studio.layers().is_empty());
    assert!(studio.code_view().text().is_empty());
    assert_eq!(studio.undo(), Err(EditorError::NoActiveDocument));
}
