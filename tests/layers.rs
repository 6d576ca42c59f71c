use std::cell::RefCell;
use std::rc::Rc;
use svg_studio::document::DocumentId;
use svg_studio::error::{EditorError, ResolutionFailure};
use svg_studio::event::{EditorEvent, EventBus, Topic};
use svg_studio::layer::{LayerId, LayerIndex};
use svg_studio::svg::{self, Element, Node, NodePath, TreeHandle};

const SVG: &str = r#"<svg><rect id="a" width="10"/><circle r="5"/></svg>"#;

fn snapshot_descriptions(bus: &EventBus) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    bus.subscribe(Topic::HistorySnapshot, move |event| {
        if let EditorEvent::SnapshotRequested { description, .. } = event {
            sink.borrow_mut().push(description.clone());
        }
    });
    seen
}

fn build(bus: &EventBus) -> (LayerIndex, TreeHandle) {
    let tree = svg::new_handle(svg::parse(SVG).unwrap());
    let mut index = LayerIndex::new(bus.clone());
    index.rebuild(DocumentId::new(), &tree);
    (index, tree)
}

#[test]
fn test_layers_resolve_after_tree_is_restructured() {
    let bus = EventBus::new();
    let (mut index, tree) = build(&bus);
    tree.borrow_mut()
        .root
        .children
        .insert(0, Node::Element(Element::new("path").with_attr("d", "M0 0")));

    assert_eq!(index.resolve(&LayerId::new("a")), Ok(NodePath::from_indices(vec![1])));
    assert_eq!(
        index.resolve(&LayerId::new("layer_1")),
        Ok(NodePath::from_indices(vec![2]))
    );

    index.set_visibility(&LayerId::new("layer_1"), false).unwrap();
    let tree = tree.borrow();
    let circle = tree.element(&NodePath::from_indices(vec![2])).unwrap();
    assert_eq!(circle.tag(), "circle");
    assert_eq!(circle.attr("display"), Some("none"));
}

#[test]
fn test_hide_then_show_records_two_snapshots() {
    let bus = EventBus::new();
    let seen = snapshot_descriptions(&bus);
    let (mut index, tree) = build(&bus);
    let original = svg::serialize(&tree.borrow());

    index.set_visibility(&LayerId::new("a"), false).unwrap();
    index.set_visibility(&LayerId::new("a"), true).unwrap();

    assert_eq!(*seen.borrow(), vec!["hide layer a", "show layer a"]);
    assert_eq!(svg::serialize(&tree.borrow()), original);
}

#[test]
fn test_deleting_a_vanished_layer_changes_nothing() {
    let bus = EventBus::new();
    let seen = snapshot_descriptions(&bus);
    let (mut index, tree) = build(&bus);
    tree.borrow_mut().remove(&NodePath::from_indices(vec![1]));
    let before = svg::serialize(&tree.borrow());

    let result = index.delete_layer(&LayerId::new("layer_1"));
    assert!(matches!(
        result,
        Err(EditorError::Resolution(ResolutionFailure::LayerLost(_)))
    ));
    assert_eq!(svg::serialize(&tree.borrow()), before);
    assert_eq!(index.len(), 2);
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_rebuild_is_published() {
    let bus = EventBus::new();
    let counts = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&counts);
    bus.subscribe(Topic::LayersRebuilt, move |event| {
        if let EditorEvent::LayersRebuilt { count, .. } = event {
            sink.borrow_mut().push(*count);
        }
    });
    build(&bus);
    assert_eq!(*counts.borrow(), vec![2]);
}

#[test]
fn test_same_tag_layers_stay_addressable_after_delete() {
    let bus = EventBus::new();
    let tree = svg::new_handle(
        svg::parse(r#"<svg><circle r="1"/><circle r="2"/><circle r="3"/></svg>"#).unwrap(),
    );
    let mut index = LayerIndex::new(bus);
    index.rebuild(DocumentId::new(), &tree);

    index.delete_layer(&LayerId::new("layer_0")).unwrap();
    assert_eq!(index.get(&LayerId::new("layer_1")).unwrap().ordinal, 0);
    index.set_visibility(&LayerId::new("layer_1"), false).unwrap();

    let expected = [("2", false), ("3", true)];
    let tree = tree.borrow();
    for (position, (radius, visible)) in expected.into_iter().enumerate() {
        let circle = tree.element(&NodePath::from_indices(vec![position])).unwrap();
        assert_eq!(circle.attr("r"), Some(radius));
        assert_eq!(svg_studio::layer::is_visible(circle), visible);
    }
}

#[test]
fn test_delete_then_delete_same_tag_removes_the_right_element() {
    let bus = EventBus::new();
    let tree = svg::new_handle(
        svg::parse(r#"<svg><rect x="1"/><rect x="2"/><rect x="3"/></svg>"#).unwrap(),
    );
    let mut index = LayerIndex::new(bus);
    index.rebuild(DocumentId::new(), &tree);

    index.delete_layer(&LayerId::new("layer_1")).unwrap();
    index.delete_layer(&LayerId::new("layer_2")).unwrap();
    assert_eq!(svg::serialize(&tree.borrow()), r#"<svg><rect x="1"/></svg>"#);
    assert_eq!(index.len(), 1);
}

#[test]
fn test_layer_panel_follows_attribute_edits() {
    let studio = svg_studio::Studio::default();
    studio
        .import_document("a.svg", r#"<svg><rect id="a" width="10"/></svg>"#)
        .unwrap();
    let id = LayerId::new("a");
    let rect = studio.layers().node_for(&id).unwrap();

    studio.set_attribute(&rect, "display", "none").unwrap();
    assert!(!studio.layers().get(&id).unwrap().visible);

    assert_eq!(studio.toggle_layer_visibility(&id), Ok(true));
    assert!(studio.layers().get(&id).unwrap().visible);
    assert_eq!(rect.with_element(|element| element.has_attr("display")), Some(false));
    let document = studio.active_document().unwrap();
    let history = studio.history();
    let last = history.entries(document).last().unwrap();
    assert_eq!(last.description, "show layer a");
}
