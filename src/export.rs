use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::color::{self, GradientKind, Paint};
use crate::config::Config;
use crate::error::{Result, TranscodeError};
use crate::mapping::{
    self, PropertyMapping, ValueKind, SUFFIX_ANCHOR, SUFFIX_OPACITY, SUFFIX_PATH, SUFFIX_TRANSFORM,
};
use crate::path_data::{self, Matrix};
use crate::scene::{self, Document, ElementId, Keyframe, Repeat};
use crate::xml::{self, XmlNode};

static CUBIC_BEZIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"cubic-bezier\(([- 0-9.]+),([- 0-9.]+),([- 0-9.]+),([- 0-9.]+)\)").unwrap()
});

const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";
const AAPT_NS: &str = "http://schemas.android.com/aapt";

/// Output paths an export call will produce: always exactly the path the
/// caller supplied.
pub fn filenames(path: &Path) -> Vec<PathBuf> {
    vec![path.to_path_buf()]
}

/// Writes the scene document as a static vector drawable.
pub fn export_static(doc: &mut Document, config: &Config, path: &Path) -> Result<()> {
    let text = vector_drawable_string(doc, config)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Writes the scene document as an animated vector drawable.
pub fn export_animated(doc: &mut Document, config: &Config, path: &Path) -> Result<()> {
    let text = animated_vector_drawable_string(doc, config)?;
    std::fs::write(path, text)?;
    Ok(())
}

pub fn vector_drawable_string(doc: &mut Document, config: &Config) -> Result<String> {
    let root = doc.root();
    let mut exporter = Exporter::new(doc, config);
    exporter.convert_dash_to_trim(root)?;
    let vd = exporter.create_vector_drawable(true)?;
    Ok(xml::serialize(&vd, config.indent))
}

pub fn animated_vector_drawable_string(doc: &mut Document, config: &Config) -> Result<String> {
    let root = doc.root();
    let mut exporter = Exporter::new(doc, config);
    exporter.convert_dash_to_trim(root)?;
    exporter.separate_motion_paths(root);
    let vd = exporter.create_vector_drawable(false)?;

    let mut avd = XmlNode::new("animated-vector");
    avd.set_attr("xmlns:android", ANDROID_NS);
    avd.set_attr("xmlns:aapt", AAPT_NS);
    let mut drawable = XmlNode::new("aapt:attr");
    drawable.set_attr("name", "android:drawable");
    drawable.children.push(vd);
    avd.children.push(drawable);

    exporter.create_animations(root, &mut avd.children)?;
    Ok(xml::serialize(&avd, config.indent))
}

/// Keyframe flattened for animator emission. The synthetic zero-reset
/// keyframe forces a zero-duration animator so repeated runs restart from a
/// known value.
struct FlatKeyframe {
    time: f64,
    value: String,
    easing: Option<String>,
    zero_reset: bool,
}

/// Per-call export state: generated-id counter, visible path counter and the
/// element-to-id map shared by all suffixed animation targets.
struct Exporter<'a> {
    doc: &'a mut Document,
    config: &'a Config,
    generated_ids: u32,
    path_count: usize,
    android_ids: HashMap<ElementId, String>,
}

impl<'a> Exporter<'a> {
    fn new(doc: &'a mut Document, config: &'a Config) -> Self {
        Self {
            doc,
            config,
            generated_ids: 0,
            path_count: 0,
            android_ids: HashMap::new(),
        }
    }

    fn hidden(&self, id: ElementId) -> bool {
        self.doc.element(id).get_property("display") == Some("none")
    }

    fn has_animatable_keyframes(&self, id: ElementId) -> bool {
        for name in self.doc.element(id).timeline.keyframe_names() {
            if name == "opacity" && id != self.doc.root() {
                continue;
            }
            if mapping::export_mapping(&name).is_some() {
                return true;
            }
        }
        false
    }

    /// Stable id for an element, generated when it has none. Queried through
    /// the map so every suffixed target of the element sees the same base id.
    fn android_id(&mut self, id: ElementId) -> String {
        if let Some(existing) = self.android_ids.get(&id) {
            return existing.clone();
        }
        let assigned = match self.doc.element(id).get_property("id") {
            Some(user_id) => user_id.to_string(),
            None => loop {
                self.generated_ids += 1;
                let candidate = format!("a{}", self.generated_ids);
                let taken = self.doc.get_element_by_id(&candidate).is_some()
                    || self.android_ids.values().any(|v| *v == candidate);
                if !taken {
                    break candidate;
                }
            },
        };
        self.android_ids.insert(id, assigned.clone());
        assigned
    }

    fn copy_id(&mut self, id: ElementId, node: &mut XmlNode, suffix: &str) {
        if !self.has_animatable_keyframes(id) {
            return;
        }
        let base = self.android_id(id);
        node.set_attr("android:name", format!("{base}{suffix}"));
    }

    fn copy_property(
        &self,
        id: ElementId,
        scene_prop: &str,
        node: &mut XmlNode,
        attr: &str,
        default: &str,
    ) {
        if let Some(value) = self.doc.element(id).get_property(scene_prop) {
            if value != default {
                node.set_attr(attr, value);
            }
        }
    }

    fn static_number(&self, id: ElementId, scene_prop: &str) -> f64 {
        self.doc
            .element(id)
            .get_property(scene_prop)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0)
    }

    /// Transform attributes for one element. The anchor point needs an extra
    /// inner group carrying only a compensating translate, because the
    /// native pivot attributes cannot be animated. Children belong under the
    /// inner group when it exists.
    fn transform_groups(&mut self, id: ElementId) -> (XmlNode, Option<XmlNode>) {
        let mut outer = XmlNode::new("group");
        self.copy_id(id, &mut outer, SUFFIX_TRANSFORM);
        self.copy_property(id, "ks:positionX", &mut outer, "android:translateX", "0");
        self.copy_property(id, "ks:positionY", &mut outer, "android:translateY", "0");
        self.copy_property(id, "ks:rotation", &mut outer, "android:rotation", "0");
        self.copy_property(id, "ks:scaleX", &mut outer, "android:scaleX", "1");
        self.copy_property(id, "ks:scaleY", &mut outer, "android:scaleY", "1");

        let ax = self.static_number(id, "ks:anchorX");
        let ay = self.static_number(id, "ks:anchorY");
        let timeline = &self.doc.element(id).timeline;
        let animated_anchor =
            timeline.has_keyframes("ks:anchorX") || timeline.has_keyframes("ks:anchorY");
        if ax != 0.0 || ay != 0.0 || animated_anchor {
            let mut inner = XmlNode::new("group");
            self.copy_id(id, &mut inner, SUFFIX_ANCHOR);
            self.copy_property(id, "ks:anchorX", &mut inner, "android:translateX", "0");
            self.copy_property(id, "ks:anchorY", &mut inner, "android:translateY", "0");
            (outer, Some(inner))
        } else {
            (outer, None)
        }
    }

    fn copy_path_properties(&mut self, id: ElementId, node: &mut XmlNode) -> Result<()> {
        self.copy_id(id, node, SUFFIX_PATH);
        self.copy_color(id, "fill", node, "android:fillColor")?;
        self.copy_color(id, "stroke", node, "android:strokeColor")?;
        self.copy_property(id, "stroke-width", node, "android:strokeWidth", "0");
        self.copy_property(id, "stroke-opacity", node, "android:strokeAlpha", "1");
        self.copy_property(id, "fill-opacity", node, "android:fillAlpha", "1");
        self.copy_property(id, "stroke-linecap", node, "android:strokeLineCap", "butt");
        self.copy_property(id, "stroke-linejoin", node, "android:strokeLineJoin", "miter");
        self.copy_property(id, "stroke-miterlimit", node, "android:strokeMiterLimit", "4");
        if let Some(rule) = self.doc.element(id).get_property("fill-rule") {
            let converted = mapping::fill_rule_to_android(rule);
            if converted != "nonZero" {
                node.set_attr("android:fillType", converted);
            }
        }
        self.copy_property(id, "d", node, "android:pathData", "");
        // dash values were preprocessed into trim fractions
        self.copy_property(id, "stroke-dasharray", node, "android:trimPathStart", "0");
        self.copy_property(id, "stroke-dashoffset", node, "android:trimPathEnd", "1");
        Ok(())
    }

    fn copy_color(
        &mut self,
        id: ElementId,
        scene_prop: &str,
        node: &mut XmlNode,
        attr: &str,
    ) -> Result<()> {
        let Some(value) = self.doc.element(id).get_property(scene_prop) else {
            return Ok(());
        };
        match color::parse_paint(value) {
            Paint::None => Ok(()),
            Paint::Solid(rgba) => {
                node.set_attr(attr, color::rgba_to_android(&rgba));
                Ok(())
            }
            Paint::Gradient(gradient) => {
                if gradient.stops.is_empty() {
                    return Ok(());
                }
                if gradient.stops.len() == 1 {
                    node.set_attr(attr, color::rgba_to_android(&gradient.stops[0].color));
                    return Ok(());
                }
                let mut grad = XmlNode::new("gradient");
                match gradient.kind {
                    GradientKind::Linear { x1, y1, x2, y2 } => {
                        let (sx, sy) = gradient.transform.apply(x1, y1);
                        let (ex, ey) = gradient.transform.apply(x2, y2);
                        grad.set_attr("android:type", "linear");
                        grad.set_attr("android:startX", fmt_number(sx));
                        grad.set_attr("android:startY", fmt_number(sy));
                        grad.set_attr("android:endX", fmt_number(ex));
                        grad.set_attr("android:endY", fmt_number(ey));
                    }
                    GradientKind::Radial { fx, fy, r, .. } => {
                        let (cx, cy) = gradient.transform.apply(fx, fy);
                        grad.set_attr("android:type", "radial");
                        grad.set_attr("android:centerX", fmt_number(cx));
                        grad.set_attr("android:centerY", fmt_number(cy));
                        grad.set_attr("android:gradientRadius", fmt_number(r));
                    }
                }
                grad.set_attr("android:tileMode", gradient.spread.to_tile_mode());

                let stops = &gradient.stops;
                let simple = (stops.len() == 2 && stops[0].offset == 0.0 && stops[1].offset == 1.0)
                    || (stops.len() == 3
                        && stops[0].offset == 0.0
                        && stops[1].offset == 0.5
                        && stops[2].offset == 1.0);
                if simple {
                    grad.set_attr("android:startColor", color::rgba_to_android(&stops[0].color));
                    if stops.len() > 2 {
                        grad.set_attr(
                            "android:centerColor",
                            color::rgba_to_android(&stops[1].color),
                        );
                    }
                    grad.set_attr(
                        "android:endColor",
                        color::rgba_to_android(&stops[stops.len() - 1].color),
                    );
                } else {
                    for stop in stops {
                        let mut item = XmlNode::new("item");
                        item.set_attr("android:color", color::rgba_to_android(&stop.color));
                        item.set_attr(
                            "android:offset",
                            fmt_rounded(stop.offset, self.config.offset_decimals),
                        );
                        grad.children.push(item);
                    }
                }

                let mut aapt = XmlNode::new("aapt:attr");
                aapt.set_attr("name", attr);
                aapt.children.push(grad);
                node.children.push(aapt);
                Ok(())
            }
        }
    }

    /// Converts the first visible clip path or mask of a group into a
    /// `clip-path` sibling node. The path data is baked with the path's own
    /// static transform at time zero. Only one clip per group is honored.
    fn process_clip_paths(&mut self, id: ElementId, out: &mut Vec<XmlNode>) -> Result<()> {
        for child in self.doc.children(id) {
            let tag = self.doc.element(child).tag_name.clone();
            if tag != "clipPath" && tag != "mask" {
                continue;
            }
            if self.hidden(child) {
                continue;
            }
            for ch in self.doc.children(child) {
                if self.hidden(ch) {
                    continue;
                }
                if self.doc.element(ch).tag_name == "path" {
                    let matrix = self.doc.transform_at(ch, 0.0);
                    self.transform_element_path(ch, &matrix)?;
                    let mut node = XmlNode::new("clip-path");
                    self.copy_id(ch, &mut node, SUFFIX_PATH);
                    self.copy_property(ch, "d", &mut node, "android:pathData", "");
                    out.push(node);
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn transform_element_path(&mut self, id: ElementId, matrix: &Matrix) -> Result<()> {
        if self.doc.element(id).timeline.has_keyframes("d") {
            self.doc.element_mut(id).timeline.simplify_easings("d");
            let kfs: Vec<Keyframe> = self.doc.element(id).timeline.keyframes("d").unwrap().to_vec();
            for kf in kfs {
                let commands = path_data::parse_path_data(&kf.value)?;
                let moved = path_data::transform(&commands, matrix);
                self.doc.element_mut(id).timeline.set_keyframe(
                    "d",
                    kf.time,
                    path_data::path_data_to_string(&moved),
                    kf.easing,
                );
            }
        } else if let Some(d) = self.doc.element(id).get_property("d") {
            let commands = path_data::parse_path_data(d)?;
            let moved = path_data::transform(&commands, matrix);
            self.doc
                .element_mut(id)
                .set_property("d", path_data::path_data_to_string(&moved));
        }
        Ok(())
    }

    fn convert_element(&mut self, id: ElementId) -> Result<XmlNode> {
        let tag = self.doc.element(id).tag_name.clone();
        let (mut outer, inner) = self.transform_groups(id);

        let mut body = Vec::new();
        self.process_clip_paths(id, &mut body)?;
        if tag == "path" {
            self.path_count += 1;
            let mut path = XmlNode::new("path");
            self.copy_path_properties(id, &mut path)?;
            body.push(path);
        } else if tag == "g" || tag == "svg" {
            for child in self.doc.children(id) {
                if self.hidden(child) {
                    continue;
                }
                let child_tag = self.doc.element(child).tag_name.clone();
                if child_tag == "g" || child_tag == "path" {
                    body.push(self.convert_element(child)?);
                }
            }
        }

        match inner {
            Some(mut inner) => {
                inner.children = body;
                outer.children.push(inner);
            }
            None => outer.children.extend(body),
        }
        Ok(outer)
    }

    fn create_vector_drawable(&mut self, with_namespace: bool) -> Result<XmlNode> {
        let root = self.doc.root();
        let mut node = self.convert_element(root)?;
        if self.path_count == 0 {
            return Err(TranscodeError::NoVisiblePath);
        }

        node.tag = "vector".to_string();
        node.attributes.clear();
        if with_namespace {
            node.set_attr("xmlns:android", ANDROID_NS);
            node.set_attr("xmlns:aapt", AAPT_NS); // for gradients
        }
        let viewbox = self
            .doc
            .element(root)
            .get_property("viewBox")
            .unwrap_or(&self.config.default_viewbox)
            .to_string();
        let values: Vec<&str> = viewbox.split_whitespace().collect();
        let width = values.get(2).copied().unwrap_or("16");
        let height = values.get(3).copied().unwrap_or("16");
        node.set_attr("android:width", format!("{width}dp"));
        node.set_attr("android:height", format!("{height}dp"));
        node.set_attr("android:viewportWidth", width);
        node.set_attr("android:viewportHeight", height);
        self.copy_property(root, "opacity", &mut node, "android:alpha", "1");
        self.copy_id(root, &mut node, SUFFIX_OPACITY);
        Ok(node)
    }

    /// Rewrites dash array and offset values into path-length-normalized
    /// trim fractions, per keyframe when animated. Keyframes are walked in
    /// reverse so earlier writes don't disturb later reads of the offsets.
    fn convert_dash_to_trim(&mut self, id: ElementId) -> Result<()> {
        for child in self.doc.children(id) {
            self.convert_dash_to_trim(child)?;
        }
        if self.doc.element(id).tag_name != "path" {
            return Ok(());
        }
        let dasharray = self
            .doc
            .element(id)
            .get_property("stroke-dasharray")
            .unwrap_or("")
            .trim()
            .to_string();
        if dasharray.is_empty() || dasharray == "none" {
            self.remove_all_keyframes(id, "stroke-dashoffset");
            self.remove_all_keyframes(id, "stroke-dasharray");
            let element = self.doc.element_mut(id);
            element.set_property("stroke-dasharray", "0"); // default trim start
            element.set_property("stroke-dashoffset", "1"); // default trim end
            return Ok(());
        }

        let dash0: f64 = dasharray
            .split([',', ' '])
            .find(|v| !v.is_empty())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0);
        let d = self.doc.element(id).get_property("d").unwrap_or("").to_string();
        let length = path_data::total_length(&path_data::parse_path_data(&d)?);

        if !self.doc.element(id).timeline.has_keyframes("stroke-dashoffset") {
            let offset = self.static_number(id, "stroke-dashoffset");
            let start = self.trim_fraction(-offset, length);
            let end = self.trim_fraction(dash0 - offset, length);
            let element = self.doc.element_mut(id);
            element.set_property("stroke-dasharray", start);
            element.set_property("stroke-dashoffset", end);
        } else {
            self.doc
                .element_mut(id)
                .timeline
                .simplify_easings("stroke-dashoffset");
            let kfs: Vec<Keyframe> = self
                .doc
                .element(id)
                .timeline
                .keyframes("stroke-dashoffset")
                .unwrap()
                .to_vec();
            for kf in kfs.iter().rev() {
                let offset: f64 = kf.value.trim().parse().unwrap_or(0.0);
                let start = self.trim_fraction(-offset, length);
                let end = self.trim_fraction(dash0 - offset, length);
                let timeline = &mut self.doc.element_mut(id).timeline;
                timeline.set_keyframe("stroke-dasharray", kf.time, start, kf.easing.clone());
                timeline.set_keyframe("stroke-dashoffset", kf.time, end, kf.easing.clone());
            }
        }
        Ok(())
    }

    fn trim_fraction(&self, value: f64, length: f64) -> String {
        let mut fraction = value / length;
        if !fraction.is_finite() {
            fraction = if value > 0.0 { 1.0 } else { 0.0 };
        }
        format!("{:.*}", self.config.trim_decimals, fraction.clamp(0.0, 1.0))
    }

    fn remove_all_keyframes(&mut self, id: ElementId, property: &str) {
        let times: Vec<f64> = self
            .doc
            .element(id)
            .timeline
            .keyframes(property)
            .map(|kfs| kfs.iter().map(|kf| kf.time).collect())
            .unwrap_or_default();
        for time in times {
            self.doc.element_mut(id).timeline.remove_keyframe(property, time);
        }
    }

    /// Motion paths must be exported as independent X/Y tracks.
    fn separate_motion_paths(&mut self, id: ElementId) {
        for child in self.doc.children(id) {
            self.separate_motion_paths(child);
        }
        if !self.doc.element(id).timeline.is_separated("ks:positionX") {
            self.doc
                .element_mut(id)
                .timeline
                .set_separated("ks:positionX", true);
        }
    }

    /// Flattens every animatable keyframe track of the element into
    /// animators, grouped into one `target` node per id suffix, then recurses
    /// into visible children.
    fn create_animations(&mut self, id: ElementId, targets: &mut Vec<XmlNode>) -> Result<()> {
        self.create_clip_path_animations(id, targets)?;

        let mut buckets: Vec<(&'static str, Vec<XmlNode>)> = Vec::new();
        for scene_prop in self.doc.element(id).timeline.keyframe_names() {
            let Some(m) = mapping::export_mapping(&scene_prop) else {
                continue; // unknown property animations are skipped
            };
            if scene_prop == "opacity" && id != self.doc.root() {
                continue; // only the root can animate opacity
            }
            self.doc.element_mut(id).timeline.simplify_easings(&scene_prop);
            let kfs: Vec<Keyframe> = self
                .doc
                .element(id)
                .timeline
                .keyframes(&scene_prop)
                .unwrap()
                .to_vec();
            if kfs.len() < 2 {
                continue;
            }
            let kfs = if scene_prop == "d" {
                scene::make_path_keyframes_interpolatable(&kfs)?
            } else {
                kfs
            };
            let mut flat: Vec<FlatKeyframe> = kfs
                .into_iter()
                .map(|kf| FlatKeyframe {
                    time: kf.time,
                    value: kf.value,
                    easing: kf.easing,
                    zero_reset: false,
                })
                .collect();
            if flat[0].time > 0.0 {
                // repeats need a known value at time zero to reset to
                flat.insert(
                    0,
                    FlatKeyframe {
                        time: 0.0,
                        value: flat[0].value.clone(),
                        easing: None,
                        zero_reset: true,
                    },
                );
            }
            let repeat = self.doc.element(id).timeline.repeat(&scene_prop);
            let animators = self.create_object_animators(id, &scene_prop, m, &flat, repeat)?;
            if animators.is_empty() {
                continue;
            }
            match buckets.iter_mut().find(|(suffix, _)| *suffix == m.id_suffix) {
                Some((_, bucket)) => bucket.extend(animators),
                None => buckets.push((m.id_suffix, animators)),
            }
        }

        for (suffix, animators) in buckets {
            let mut aapt = XmlNode::new("aapt:attr");
            aapt.set_attr("name", "android:animation");
            if animators.len() > 1 {
                let mut set = XmlNode::new("set");
                set.children = animators;
                aapt.children.push(set);
            } else {
                aapt.children.extend(animators);
            }
            let base = self.android_id(id);
            let mut target = XmlNode::new("target");
            target.set_attr("android:name", format!("{base}{suffix}"));
            target.children.push(aapt);
            targets.push(target);
        }

        let tag = self.doc.element(id).tag_name.clone();
        if tag == "g" || tag == "svg" {
            for child in self.doc.children(id) {
                if self.hidden(child) {
                    continue;
                }
                let child_tag = self.doc.element(child).tag_name.clone();
                if child_tag == "g" || child_tag == "path" {
                    self.create_animations(child, targets)?;
                }
            }
        }
        Ok(())
    }

    fn create_clip_path_animations(&mut self, id: ElementId, targets: &mut Vec<XmlNode>) -> Result<()> {
        for child in self.doc.children(id) {
            if self.hidden(child) {
                continue;
            }
            let tag = self.doc.element(child).tag_name.clone();
            if tag == "clipPath" || tag == "mask" {
                for ch in self.doc.children(child) {
                    if self.hidden(ch) {
                        continue;
                    }
                    if self.doc.element(ch).tag_name == "path" {
                        self.create_animations(ch, targets)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn create_object_animators(
        &mut self,
        id: ElementId,
        scene_prop: &str,
        m: &PropertyMapping,
        kfs: &[FlatKeyframe],
        repeat: Repeat,
    ) -> Result<Vec<XmlNode>> {
        let mut animators = Vec::new();
        let mut last_span = (0.0, 0.0);
        for pair in kfs.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            let mut from_value = from.value.clone();
            let mut to_value = to.value.clone();
            if m.value_kind == ValueKind::Color {
                let endpoints = (color::parse_paint(&from_value), color::parse_paint(&to_value));
                match endpoints {
                    (Paint::Solid(f), Paint::Solid(t)) => {
                        from_value = color::rgba_to_android(&f);
                        to_value = color::rgba_to_android(&t);
                    }
                    _ => {
                        let element = match self.doc.element(id).get_property("id") {
                            Some(user_id) => format!("'{user_id}'"),
                            None => "unknown-id".to_string(),
                        };
                        return Err(TranscodeError::UnsupportedColorAnimation {
                            element,
                            property: scene_prop.to_string(),
                        });
                    }
                }
            }
            let mut duration = to.time - from.time;
            // path animation may contain zero-duration segments when the
            // subpath count changes; those are dropped
            if duration == 0.0 && !from.zero_reset {
                continue;
            }
            if from.zero_reset {
                duration = 0.0;
            }
            let mut node = XmlNode::new("objectAnimator");
            node.set_attr("android:propertyName", m.android_prop);
            node.set_attr("android:duration", fmt_number(duration));
            node.set_attr("android:valueFrom", from_value);
            node.set_attr("android:valueTo", to_value);
            if from.time > 0.0 {
                node.set_attr("android:startOffset", fmt_number(from.time));
            }
            if let Some(value_type) = m.value_kind.android_value_type() {
                node.set_attr("android:valueType", value_type);
            }
            add_interpolator(&mut node, from.easing.as_deref());
            last_span = (from.time, duration);
            animators.push(node);
        }
        // repeat parameters are only expressible when one animator covers
        // the whole track
        if animators.len() == 1 {
            if let Some(count) = repeat_count_attr(repeat, last_span.0, last_span.1) {
                animators[0].set_attr("android:repeatCount", count);
            }
        }
        Ok(animators)
    }
}

fn repeat_count_attr(repeat: Repeat, start: f64, duration: f64) -> Option<String> {
    match repeat {
        Repeat::None => None,
        Repeat::Infinite => Some("infinite".to_string()),
        Repeat::Until(end) => {
            if duration <= 0.0 {
                return None;
            }
            let count = (end - start) / duration - 1.0;
            let rounded = count.round();
            if rounded >= 1.0 && (count - rounded).abs() < 1e-6 {
                Some(format!("{}", rounded as i64))
            } else {
                None
            }
        }
    }
}

fn add_interpolator(node: &mut XmlNode, easing: Option<&str>) {
    let easing = easing.unwrap_or("linear");
    if easing == "linear" {
        node.set_attr("android:interpolator", "@android:interpolator/linear");
        return;
    }
    let path = if let Some(caps) = CUBIC_BEZIER_RE.captures(easing) {
        Some(format!(
            "M0,0 C{},{} {},{} 1,1",
            caps[1].trim(),
            caps[2].trim(),
            caps[3].trim(),
            caps[4].trim()
        ))
    } else if easing.starts_with("steps(") {
        if easing.contains("start") {
            Some("M0,0 L0,1 1,1".to_string())
        } else {
            Some("M0,0 L1,0 1,1".to_string())
        }
    } else {
        None
    };
    match path {
        Some(path) => {
            // custom curves cannot live in a plain attribute value
            let mut interpolator = XmlNode::new("pathInterpolator");
            interpolator.set_attr("android:pathData", path);
            let mut aapt = XmlNode::new("aapt:attr");
            aapt.set_attr("name", "android:interpolator");
            aapt.children.push(interpolator);
            node.children.push(aapt);
        }
        // unsupported easing keywords degrade to linear
        None => node.set_attr("android:interpolator", "@android:interpolator/linear"),
    }
}

fn fmt_number(value: f64) -> String {
    let rounded = (value * 1e4).round() / 1e4;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

fn fmt_rounded(value: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    format!("{rounded}")
}
