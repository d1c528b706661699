use avd_transcoder::config::Config;
use avd_transcoder::error::TranscodeError;
use avd_transcoder::export;
use avd_transcoder::import;
use avd_transcoder::scene::{Document, ElementId, Repeat};
use avd_transcoder::xml;

fn scene_with_path(d: &str) -> (Document, ElementId) {
    let mut doc = Document::new();
    let path = doc.create_element("path");
    doc.append_child(doc.root(), path);
    doc.element_mut(path).set_property("d", d);
    doc.element_mut(path).set_property("fill", "#ff0000");
    doc.element_mut(path).set_property("id", "dot");
    (doc, path)
}

fn reimport(text: &str) -> Document {
    let mut doc = Document::new();
    import::import_str(&mut doc, &Config::default(), text).expect("reimport failed");
    doc
}

// static exports carry no android:name attributes, so imported elements
// must be found by walking the tree
fn first_path(doc: &Document) -> ElementId {
    fn walk(doc: &Document, id: ElementId) -> Option<ElementId> {
        if doc.element(id).tag_name == "path" {
            return Some(id);
        }
        doc.children(id).into_iter().find_map(|c| walk(doc, c))
    }
    walk(doc, doc.root()).expect("no path element")
}

#[test]
fn static_export_reimports_to_same_shape() {
    let (mut doc, _) = scene_with_path("M0,0 L10,0 L10,10 Z");
    doc.element_mut(doc.root()).set_property("viewBox", "0 0 24 24");
    let text = export::vector_drawable_string(&mut doc, &Config::default()).unwrap();

    let back = reimport(&text);
    let root = back.root();
    assert_eq!(back.element(root).get_property("viewBox"), Some("0 0 24 24"));
    let path = first_path(&back);
    assert_eq!(back.element(path).get_property("fill"), Some("#ff0000"));
    assert_eq!(back.element(path).get_property("d"), Some("M0,0 L10,0 L10,10 Z"));
}

#[test]
fn serialized_output_survives_parse_and_reserialize() {
    let (mut doc, path) = scene_with_path("M0,0 L10,0");
    doc.element_mut(path).set_property("stroke", "#00ff00");
    doc.element_mut(path).set_property("stroke-width", "2");
    let config = Config::default();
    let text = export::vector_drawable_string(&mut doc, &config).unwrap();

    let tree = xml::parse(&text).unwrap();
    assert_eq!(xml::serialize(&tree, config.indent), text);
}

#[test]
fn animated_keyframes_round_trip() {
    let (mut doc, path) = scene_with_path("M0,0 L10,0");
    let tl = &mut doc.element_mut(path).timeline;
    tl.set_keyframe("ks:positionX", 0.0, "0".into(), Some("linear".into()));
    tl.set_keyframe("ks:positionX", 150.0, "4".into(), Some("ease-in-out".into()));
    tl.set_keyframe("ks:positionX", 300.0, "10".into(), None);
    let text = export::animated_vector_drawable_string(&mut doc, &Config::default()).unwrap();

    let back = reimport(&text);
    let group = back.get_element_by_id("dot_t").unwrap();
    let kfs = back.element(group).timeline.keyframes("ks:positionX").unwrap();
    assert_eq!(kfs.len(), 3);
    assert_eq!(kfs[0].time, 0.0);
    assert_eq!(kfs[0].value, "0");
    assert_eq!(kfs[0].easing.as_deref(), Some("linear"));
    assert_eq!(kfs[1].time, 150.0);
    assert_eq!(
        kfs[1].easing.as_deref(),
        Some("cubic-bezier(0.42, 0, 0.58, 1)")
    );
    assert_eq!(kfs[2].time, 300.0);
    assert_eq!(kfs[2].value, "10");
}

#[test]
fn dash_values_round_trip_through_trim_fractions() {
    let (mut doc, path) = scene_with_path("M0,0 L10,0");
    doc.element_mut(path).set_property("stroke", "#000000");
    doc.element_mut(path).set_property("stroke-dasharray", "5");
    doc.element_mut(path).set_property("stroke-dashoffset", "-2.5");
    let text = export::vector_drawable_string(&mut doc, &Config::default()).unwrap();

    let tree = xml::parse(&text).unwrap();
    let path_node = &tree.children[0].children[0];
    assert_eq!(path_node.attr("android:trimPathStart"), Some("0.250"));
    assert_eq!(path_node.attr("android:trimPathEnd"), Some("0.750"));

    let back = reimport(&text);
    let path = first_path(&back);
    assert_eq!(back.element(path).get_property("stroke-dasharray"), Some("5 10"));
    assert_eq!(back.element(path).get_property("stroke-dashoffset"), Some("-2.5"));
}

#[test]
fn infinite_repeat_round_trips() {
    let (mut doc, path) = scene_with_path("M0,0 L10,0");
    let tl = &mut doc.element_mut(path).timeline;
    tl.set_keyframe("ks:rotation", 0.0, "0".into(), Some("linear".into()));
    tl.set_keyframe("ks:rotation", 300.0, "360".into(), None);
    tl.set_repeat("ks:rotation", Repeat::Infinite);
    let text = export::animated_vector_drawable_string(&mut doc, &Config::default()).unwrap();

    let back = reimport(&text);
    let group = back.get_element_by_id("dot_t").unwrap();
    assert_eq!(back.element(group).timeline.repeat("ks:rotate"), Repeat::Infinite);
}

#[test]
fn finite_repeat_round_trips_as_absolute_end() {
    let (mut doc, path) = scene_with_path("M0,0 L10,0");
    let tl = &mut doc.element_mut(path).timeline;
    tl.set_keyframe("ks:rotation", 0.0, "0".into(), Some("linear".into()));
    tl.set_keyframe("ks:rotation", 300.0, "360".into(), None);
    tl.set_repeat("ks:rotation", Repeat::Until(900.0));
    let text = export::animated_vector_drawable_string(&mut doc, &Config::default()).unwrap();

    let tree = xml::parse(&text).unwrap();
    let target = tree.children.iter().find(|c| c.tag == "target").unwrap();
    let animator = &target.children[0].children[0];
    // 0..900 over a 300ms animator means two extra runs
    assert_eq!(animator.attr("android:repeatCount"), Some("2"));

    let back = reimport(&text);
    let group = back.get_element_by_id("dot_t").unwrap();
    assert_eq!(
        back.element(group).timeline.repeat("ks:rotate"),
        Repeat::Until(900.0)
    );
}

#[test]
fn anchor_groups_round_trip_as_pivot_pair() {
    let (mut doc, path) = scene_with_path("M0,0 L10,0");
    doc.element_mut(path).set_property("ks:anchorX", "-8");
    doc.element_mut(path).set_property("ks:anchorY", "-4");
    doc.element_mut(path).set_property("ks:rotation", "45");
    let tl = &mut doc.element_mut(path).timeline;
    tl.set_keyframe("ks:scaleX", 0.0, "1".into(), Some("linear".into()));
    tl.set_keyframe("ks:scaleX", 200.0, "2".into(), None);
    let text = export::animated_vector_drawable_string(&mut doc, &Config::default()).unwrap();

    let back = reimport(&text);
    // the exported anchor pair comes back as outer and inner groups
    let outer = back.get_element_by_id("dot_t").unwrap();
    assert_eq!(back.element(outer).tag_name, "g");
    let inner = back.get_element_by_id("dot_a").unwrap();
    assert_eq!(back.element(inner).parent(), Some(outer));
    assert_eq!(back.element(inner).get_property("ks:positionX"), Some("-8"));
    let kfs = back.element(outer).timeline.keyframes("ks:scaleX").unwrap();
    assert_eq!(kfs.len(), 2);
    assert_eq!(kfs[1].value, "2");
}

#[test]
fn gradient_fill_round_trips() {
    let (mut doc, path) = scene_with_path("M0,0 L10,0");
    doc.element_mut(path).set_property(
        "fill",
        "-ks-linear-gradient(userSpaceOnUse 0 0 10 0 pad matrix(1 0 0 1 0 0), #ff0000 0%, #0000ff 100%)",
    );
    let text = export::vector_drawable_string(&mut doc, &Config::default()).unwrap();

    let back = reimport(&text);
    let path = first_path(&back);
    let fill = back.element(path).get_property("fill").unwrap();
    assert!(fill.starts_with("-ks-linear-gradient(userSpaceOnUse 0 0 10 0 pad"), "fill: {fill}");
    assert!(fill.contains("#ff0000 0%"), "fill: {fill}");
    assert!(fill.contains("#0000ff 100%"), "fill: {fill}");
}

#[test]
fn document_without_visible_paths_is_rejected() {
    let mut doc = Document::new();
    let group = doc.create_element("g");
    doc.append_child(doc.root(), group);
    let path = doc.create_element("path");
    doc.append_child(group, path);
    doc.element_mut(path).set_property("d", "M0,0 L1,1");
    doc.element_mut(path).set_property("display", "none");
    match export::vector_drawable_string(&mut doc, &Config::default()) {
        Err(TranscodeError::NoVisiblePath) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn sequential_sets_chain_keyframe_times_on_reimport() {
    let (mut doc, path) = scene_with_path("M0,0 L10,0");
    let tl = &mut doc.element_mut(path).timeline;
    tl.set_keyframe("ks:positionX", 0.0, "0".into(), Some("linear".into()));
    tl.set_keyframe("ks:positionX", 100.0, "5".into(), Some("linear".into()));
    tl.set_keyframe("ks:positionX", 300.0, "10".into(), None);
    tl.set_keyframe("ks:positionY", 0.0, "0".into(), Some("linear".into()));
    tl.set_keyframe("ks:positionY", 100.0, "2".into(), Some("linear".into()));
    tl.set_keyframe("ks:positionY", 300.0, "4".into(), None);
    let text = export::animated_vector_drawable_string(&mut doc, &Config::default()).unwrap();

    let back = reimport(&text);
    let group = back.get_element_by_id("dot_t").unwrap();
    let x_times: Vec<f64> = back
        .element(group)
        .timeline
        .keyframes("ks:positionX")
        .unwrap()
        .iter()
        .map(|kf| kf.time)
        .collect();
    assert_eq!(x_times, vec![0.0, 100.0, 300.0]);
    // aligned axis timings fold the separated flag away again
    assert!(!back.element(group).timeline.is_separated("ks:positionX"));
}
