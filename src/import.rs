use std::collections::HashMap;
use std::path::Path;

use crate::color::{self, PlaceholderColors, Spread};
use crate::config::Config;
use crate::error::{Result, TranscodeError};
use crate::mapping::{self, PIVOT_ID_SUFFIX};
use crate::path_data::{self, PathCommand};
use crate::scene::{Document, ElementId, Keyframe, Repeat};
use crate::xml::{self, XmlNode};

/// Stand-in path data for drawable resource references that cannot be
/// resolved outside an Android build.
const PLACEHOLDER_PATH: &str = "M0,0C0,0,-3,2,-6,2C-9,2,-13,0.5,-13,-4C-13,-8.5,-9.5,-11,-6,-11\
C-2.5,-11,-1,-8.5,-1,-6C-1,-3.5,-2.5,-1,-4,-1C-5.5,-1,-3.3,-8.5,-3.3,-8.5\
C-3.3,-8.5,-5,-1,-7.6,-1C-9.5,-1,-10,-2.58021,-10,-4.5C-10,-6.5,-8.5,-8.4,-6.5,-8.4\
C-4.5,-8.4,-4.3,-6.5,-4.3,-5";

/// Confidence score for the file picker: 100 when the file looks like a
/// (animated) vector drawable, 0 otherwise.
pub fn recognize(path: &Path, content: &str) -> u32 {
    let is_xml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
    if is_xml && (content.contains("animated-vector") || content.contains("<vector")) {
        100
    } else {
        0
    }
}

pub fn import_file(doc: &mut Document, config: &Config, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    import_str(doc, config, &content)
}

/// Imports a vector or animated vector drawable into the scene document.
pub fn import_str(doc: &mut Document, config: &Config, text: &str) -> Result<()> {
    let tree = xml::parse(text)?;
    let mut importer = Importer::new(doc, config);
    match tree.tag.as_str() {
        "vector" => {
            importer.process_vector(&tree)?;
            importer.finish()
        }
        "animated-vector" => {
            let drawable = tree
                .children
                .iter()
                .find(|c| c.tag == "aapt:attr" && c.attr("name") == Some("android:drawable"))
                .ok_or_else(|| {
                    TranscodeError::invalid(
                        "the 'aapt:attr' element with 'android:drawable' is not found",
                    )
                })?;
            let vector = drawable
                .children
                .iter()
                .find(|c| c.tag == "vector")
                .ok_or_else(|| TranscodeError::invalid("the 'vector' element is not found"))?;
            importer.process_vector(vector)?;
            importer.process_animations(&tree)?;
            importer.finish()
        }
        _ => Err(TranscodeError::invalid(
            "root element is not 'vector' or 'animated-vector'",
        )),
    }
}

fn reverse_value(value: &str) -> String {
    fmt_number(-value.trim().parse::<f64>().unwrap_or(0.0))
}

fn fix_path_data(value: &str) -> String {
    // some generators emit a stray close-like token before subpaths
    value.replace("c  M", "z  M")
}

fn fill_rule(value: &str) -> String {
    mapping::fill_rule_to_svg(value)
}

/// Per-call import state. `pivot_ids` maps a group's id to the id of its
/// synthetic pivot group so pivot-relative animations can be redirected.
struct Importer<'a> {
    doc: &'a mut Document,
    config: &'a Config,
    pivot_ids: HashMap<String, String>,
    placeholders: PlaceholderColors,
}

impl<'a> Importer<'a> {
    fn new(doc: &'a mut Document, config: &'a Config) -> Self {
        Self {
            doc,
            config,
            pivot_ids: HashMap::new(),
            placeholders: PlaceholderColors::default(),
        }
    }

    fn process_vector(&mut self, node: &XmlNode) -> Result<()> {
        let root = self.doc.root();
        let vpw = node.attr("android:viewportWidth").unwrap_or("0");
        let vph = node.attr("android:viewportHeight").unwrap_or("0");
        let w: f64 = vpw.trim().parse().unwrap_or(0.0);
        let h: f64 = vph.trim().parse().unwrap_or(0.0);
        if w != 0.0 && h != 0.0 {
            self.doc
                .element_mut(root)
                .set_property("viewBox", format!("0 0 {vpw} {vph}"));
        }
        self.copy_property(node, "android:alpha", root, "opacity", None);
        self.copy_property(node, "android:name", root, "id", None);
        self.process_renderable(node, root)
    }

    /// Copies an attribute onto a scene property. Resource and theme
    /// references are skipped, except path data which gets a placeholder
    /// shape.
    fn copy_property(
        &mut self,
        node: &XmlNode,
        android_attr: &str,
        elem: ElementId,
        scene_prop: &str,
        processor: Option<fn(&str) -> String>,
    ) {
        let Some(value) = node.attr(android_attr) else {
            return;
        };
        let mut value = value.to_string();
        if scene_prop == "d" && value.starts_with('@') {
            value = PLACEHOLDER_PATH.to_string();
        }
        if value.starts_with('@') || value.starts_with('?') {
            return;
        }
        if let Some(processor) = processor {
            value = processor(&value);
        }
        self.doc.element_mut(elem).set_property(scene_prop, value);
    }

    fn process_renderable(&mut self, node: &XmlNode, parent: ElementId) -> Result<()> {
        let mut parent = parent;
        for child in &node.children {
            match child.tag.as_str() {
                "group" => self.process_group(child, parent)?,
                "path" => self.process_path(child, parent)?,
                // later siblings are clipped, earlier ones are not
                "clip-path" => parent = self.process_clip_path(child, parent),
                _ => {}
            }
        }
        Ok(())
    }

    fn process_group(&mut self, node: &XmlNode, parent: ElementId) -> Result<()> {
        let elem = self.doc.create_element("g");
        self.copy_property(node, "android:name", elem, "id", None);
        self.copy_property(node, "android:translateX", elem, "ks:positionX", None);
        self.copy_property(node, "android:translateY", elem, "ks:positionY", None);

        let px: f64 = node
            .attr("android:pivotX")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0);
        let py: f64 = node
            .attr("android:pivotY")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0);
        // a nonzero pivot needs an extra group, because pivoting equals
        // "translate(px,py) scale rotate translate(-px,-py)"
        let (attach, transform_elem) = if px != 0.0 || py != 0.0 {
            self.copy_property(node, "android:pivotX", elem, "ks:anchorX", None);
            self.copy_property(node, "android:pivotY", elem, "ks:anchorY", None);
            let pivot = self.doc.create_element("g");
            if let Some(name) = node.attr("android:name") {
                let pivot_id = format!("{name}{PIVOT_ID_SUFFIX}");
                self.doc
                    .element_mut(pivot)
                    .set_property("id", pivot_id.clone());
                self.pivot_ids.insert(name.to_string(), pivot_id);
            }
            self.doc.append_child(parent, elem);
            (elem, pivot)
        } else {
            (parent, elem)
        };

        self.copy_property(node, "android:scaleX", transform_elem, "ks:scaleX", None);
        self.copy_property(node, "android:scaleY", transform_elem, "ks:scaleY", None);
        self.copy_property(node, "android:rotation", transform_elem, "ks:rotate", None);
        self.copy_property(
            node,
            "android:pivotX",
            transform_elem,
            "ks:anchorX",
            Some(reverse_value),
        );
        self.copy_property(
            node,
            "android:pivotY",
            transform_elem,
            "ks:anchorY",
            Some(reverse_value),
        );
        self.doc.append_child(attach, transform_elem);
        self.process_renderable(node, transform_elem)
    }

    fn process_path(&mut self, node: &XmlNode, parent: ElementId) -> Result<()> {
        let elem = self.doc.create_element("path");
        self.copy_property(node, "android:name", elem, "id", None);
        self.copy_color(node, "android:fillColor", elem, "fill")?;
        self.copy_property(node, "android:fillAlpha", elem, "fill-opacity", None);
        self.copy_color(node, "android:strokeColor", elem, "stroke")?;
        self.copy_property(node, "android:strokeAlpha", elem, "stroke-opacity", None);
        self.copy_property(node, "android:strokeWidth", elem, "stroke-width", None);
        self.copy_property(node, "android:strokeLineCap", elem, "stroke-linecap", None);
        self.copy_property(node, "android:strokeLineJoin", elem, "stroke-linejoin", None);
        self.copy_property(node, "android:strokeMiterLimit", elem, "stroke-miterlimit", None);
        self.copy_property(node, "android:fillType", elem, "fill-rule", Some(fill_rule));
        self.copy_property(node, "android:pathData", elem, "d", Some(fix_path_data));
        // trim fractions are converted back to dash values at the end
        self.copy_property(node, "android:trimPathStart", elem, "stroke-dasharray", None);
        self.copy_property(node, "android:trimPathEnd", elem, "stroke-dashoffset", None);
        self.doc.append_child(parent, elem);
        Ok(())
    }

    /// Builds a wrapping group with a `clipPath` inside and returns the
    /// wrapper so the remaining siblings import under it.
    fn process_clip_path(&mut self, node: &XmlNode, parent: ElementId) -> ElementId {
        let wrapper = self.doc.create_element("g");
        let clip = self.doc.create_element("clipPath");
        let path = self.doc.create_element("path");
        self.copy_property(node, "android:name", path, "id", None);
        self.copy_property(node, "android:pathData", path, "d", Some(fix_path_data));
        self.doc.element_mut(path).set_property("fill", "#000000");
        self.doc.append_child(parent, wrapper);
        self.doc.append_child(wrapper, clip);
        self.doc.append_child(clip, path);
        wrapper
    }

    fn copy_color(
        &mut self,
        node: &XmlNode,
        android_attr: &str,
        elem: ElementId,
        scene_prop: &str,
    ) -> Result<()> {
        if scene_prop == "fill" {
            // fill default value is "none"
            self.doc.element_mut(elem).set_property(scene_prop, "none");
        }
        for child in &node.children {
            if child.tag == "aapt:attr" && child.attr("name") == Some(android_attr) {
                return self.copy_gradient(child, elem, scene_prop);
            }
        }
        let Some(value) = node.attr(android_attr) else {
            return Ok(());
        };
        let converted = color::android_color_to_svg(value, true, &mut self.placeholders);
        self.doc.element_mut(elem).set_property(scene_prop, converted);
        Ok(())
    }

    fn copy_gradient(&mut self, aapt: &XmlNode, elem: ElementId, scene_prop: &str) -> Result<()> {
        for child in &aapt.children {
            if child.tag != "gradient" {
                continue;
            }
            let mut value = if child.attr("android:type") == Some("radial") {
                let cx = child.attr("android:centerX").unwrap_or("0");
                let cy = child.attr("android:centerY").unwrap_or("0");
                let r = child.attr("android:gradientRadius").ok_or_else(|| {
                    TranscodeError::MissingRequiredAttribute("android:gradientRadius".to_string())
                })?;
                format!("-ks-radial-gradient(userSpaceOnUse {r} {cx} {cy} {cx} {cy} ")
            } else {
                let sx = child.attr("android:startX").unwrap_or("0");
                let sy = child.attr("android:startY").unwrap_or("0");
                let ex = child.attr("android:endX").unwrap_or("0");
                let ey = child.attr("android:endY").unwrap_or("0");
                format!("-ks-linear-gradient(userSpaceOnUse {sx} {sy} {ex} {ey} ")
            };
            let spread = Spread::from_tile_mode(child.attr("android:tileMode").unwrap_or("clamp"));

            let mut stops = Vec::new();
            let items: Vec<&XmlNode> =
                child.children.iter().filter(|c| c.tag == "item").collect();
            if items.len() > 1 {
                for item in items {
                    let color = item.attr("android:color").unwrap_or("#00000000");
                    let offset = item.attr("android:offset").unwrap_or("0");
                    stops.push(format!(
                        "{} {}",
                        color::android_color_to_svg(color, false, &mut self.placeholders),
                        offset
                    ));
                }
            } else {
                let start = child.attr("android:startColor").unwrap_or("#00000000");
                stops.push(format!(
                    "{} 0%",
                    color::android_color_to_svg(start, false, &mut self.placeholders)
                ));
                if let Some(center) = child.attr("android:centerColor") {
                    stops.push(format!(
                        "{} 50%",
                        color::android_color_to_svg(center, false, &mut self.placeholders)
                    ));
                }
                let end = child.attr("android:endColor").unwrap_or("#00000000");
                stops.push(format!(
                    "{} 100%",
                    color::android_color_to_svg(end, false, &mut self.placeholders)
                ));
            }
            value += &format!("{} matrix(1 0 0 1 0 0), {})", spread.to_svg(), stops.join(", "));
            self.doc.element_mut(elem).set_property(scene_prop, value);
        }
        Ok(())
    }

    fn process_animations(&mut self, root: &XmlNode) -> Result<()> {
        for child in &root.children {
            if child.tag != "target" {
                continue;
            }
            let target_id = child.attr("android:name").unwrap_or("");
            let Some(elem) = self.doc.get_element_by_id(target_id) else {
                continue;
            };
            let Some(aapt) = child.children.first() else {
                continue;
            };
            if aapt.tag != "aapt:attr" || aapt.attr("name") != Some("android:animation") {
                continue;
            }
            if aapt.children.len() != 1 {
                return Err(TranscodeError::invalid(
                    "'aapt:attr' must have exactly one child element",
                ));
            }
            self.process_animator_or_set(&aapt.children[0], elem, 0.0)?;
        }
        Ok(())
    }

    /// Processes a `set` or `objectAnimator`, returning the end time of the
    /// subtree relative to its container. Sequential sets advance the begin
    /// time by each child's end; parallel sets span their longest child.
    fn process_animator_or_set(
        &mut self,
        node: &XmlNode,
        elem: ElementId,
        begin: f64,
    ) -> Result<f64> {
        if node.tag == "set" {
            let sequential = node.attr("android:ordering") == Some("sequentially");
            let mut begin_time = begin;
            let mut max_dur = 0.0f64;
            for child in &node.children {
                let child_dur = self.process_animator_or_set(child, elem, begin_time)?;
                if sequential {
                    begin_time += child_dur;
                }
                if max_dur < child_dur {
                    max_dur = child_dur;
                }
            }
            Ok(if sequential { begin_time } else { begin_time + max_dur })
        } else {
            self.process_object_animator(node, elem, begin)
        }
    }

    fn process_object_animator(
        &mut self,
        node: &XmlNode,
        elem: ElementId,
        begin: f64,
    ) -> Result<f64> {
        if node.tag != "objectAnimator" {
            return Ok(0.0);
        }
        let mut start_offset: f64 = node
            .attr("android:startOffset")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0);
        let duration: f64 = node
            .attr("android:duration")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(self.config.default_duration_ms);
        if start_offset < 0.0 {
            start_offset = 0.0;
        }
        if duration < 0.0 {
            return Err(TranscodeError::invalid("duration cannot be negative"));
        }
        if duration == 0.0 {
            // no real animation
            return Ok(start_offset);
        }
        let interpolator = node.attr("android:interpolator");
        let repeat_count = node.attr("android:repeatCount");

        let mut has_holder = false;
        for holder in &node.children {
            if holder.tag == "propertyValuesHolder" {
                self.process_property_value_holder(
                    holder,
                    elem,
                    begin,
                    start_offset,
                    duration,
                    interpolator,
                    repeat_count,
                )?;
                has_holder = true;
            }
        }
        if !has_holder {
            self.process_property_value_holder(
                node,
                elem,
                begin,
                start_offset,
                duration,
                interpolator,
                repeat_count,
            )?;
        }
        Ok(start_offset + duration)
    }

    #[allow(clippy::too_many_arguments)]
    fn process_property_value_holder(
        &mut self,
        node: &XmlNode,
        elem: ElementId,
        begin: f64,
        start_offset: f64,
        duration: f64,
        interpolator: Option<&str>,
        repeat_count: Option<&str>,
    ) -> Result<()> {
        let Some(property_name) = node.attr("android:propertyName") else {
            return Ok(());
        };
        let Some(m) = mapping::import_mapping(property_name) else {
            return Ok(());
        };
        if property_name == "alpha" && self.doc.element(elem).parent().is_some() {
            // only the root can have alpha animations
            return Ok(());
        }

        let mut elem = elem;
        if m.pivot_relative {
            let pivot_id = self
                .doc
                .element(elem)
                .get_property("id")
                .and_then(|id| self.pivot_ids.get(id))
                .cloned();
            if let Some(pivot_id) = pivot_id {
                if let Some(pivot_elem) = self.doc.get_element_by_id(&pivot_id) {
                    elem = pivot_elem;
                }
            }
        }

        let scene_prop = m.scene_prop;
        let mut easing = mapping::interpolator_to_easing(interpolator);
        if let Some(from_child) = read_interpolator_from_child(node) {
            easing = Some(from_child);
        }

        // adding keyframes over old keyframes does not work with repeating
        let mut repeat_count = repeat_count;
        if self.doc.element(elem).timeline.has_keyframes(scene_prop) {
            self.doc
                .element_mut(elem)
                .timeline
                .set_repeat(scene_prop, Repeat::None);
            repeat_count = None;
        }

        let t0 = begin + start_offset;
        let t1 = t0 + duration;
        self.remove_keyframes_between(elem, scene_prop, t0, t1);

        if node.tag == "propertyValuesHolder" && self.process_keyframes(node, elem, t0, duration, scene_prop) {
            self.set_track_repeat(elem, scene_prop, begin, start_offset, duration, repeat_count)?;
            if m.separated_axis {
                self.doc
                    .element_mut(elem)
                    .timeline
                    .set_separated(scene_prop, true);
            }
            return Ok(());
        }

        let value_from = node.attr("android:valueFrom").unwrap_or("").to_string();
        let value_to = node.attr("android:valueTo").unwrap_or("").to_string();

        // the end keyframe goes in first so the eased start keyframe wins
        // when the span abuts an earlier animator
        let timeline = &mut self.doc.element_mut(elem).timeline;
        timeline.set_keyframe(scene_prop, t1, value_to, None);
        timeline.set_keyframe(scene_prop, t0, value_from, easing);
        if m.separated_axis {
            timeline.set_separated(scene_prop, true);
        }
        self.set_track_repeat(elem, scene_prop, begin, start_offset, duration, repeat_count)
    }

    fn process_keyframes(
        &mut self,
        node: &XmlNode,
        elem: ElementId,
        start_time: f64,
        duration: f64,
        scene_prop: &str,
    ) -> bool {
        let mut found = false;
        for kf in &node.children {
            if kf.tag != "keyframe" {
                continue;
            }
            found = true;
            let (Some(fraction), Some(value)) = (kf.attr("android:fraction"), kf.attr("android:value"))
            else {
                continue;
            };
            let fraction: f64 = fraction.trim().parse().unwrap_or(0.0);
            self.doc.element_mut(elem).timeline.set_keyframe(
                scene_prop,
                start_time + fraction * duration,
                value.to_string(),
                Some("linear".to_string()),
            );
        }
        found
    }

    /// Removes keyframes strictly between the given times.
    fn remove_keyframes_between(&mut self, elem: ElementId, scene_prop: &str, start: f64, end: f64) {
        let times: Vec<f64> = self
            .doc
            .element(elem)
            .timeline
            .keyframes(scene_prop)
            .map(|kfs| {
                kfs.iter()
                    .map(|kf| kf.time)
                    .filter(|t| start < *t && *t < end)
                    .collect()
            })
            .unwrap_or_default();
        for time in times {
            self.doc
                .element_mut(elem)
                .timeline
                .remove_keyframe(scene_prop, time);
        }
    }

    fn set_track_repeat(
        &mut self,
        elem: ElementId,
        scene_prop: &str,
        begin: f64,
        start_offset: f64,
        duration: f64,
        repeat_count: Option<&str>,
    ) -> Result<()> {
        let Some(count) = repeat_count else {
            return Ok(());
        };
        if count == "infinite" || count == "-1" {
            self.doc
                .element_mut(elem)
                .timeline
                .set_repeat(scene_prop, Repeat::Infinite);
            return Ok(());
        }
        let value: f64 = count.trim().parse().unwrap_or(f64::NAN);
        if value.floor() != value {
            return Err(TranscodeError::InvalidRepeatCount(count.to_string()));
        }
        if value < 1.0 {
            // includes negative values, which really disable the animation
            return Ok(());
        }
        let end = begin + start_offset + duration * (value + 1.0);
        self.doc
            .element_mut(elem)
            .timeline
            .set_repeat(scene_prop, Repeat::Until(end));
        Ok(())
    }

    /// Post-import pass: turn trim fractions back into dash values and fold
    /// independently imported X/Y tracks together where their timing agrees.
    fn finish(&mut self) -> Result<()> {
        let ids: Vec<ElementId> = self.doc.element_ids().collect();
        for id in ids {
            if self.doc.element(id).tag_name == "path" {
                self.convert_trim_to_dash(id)?;
            }
            self.merge_axis_tracks(id, "ks:positionX", "ks:positionY");
            self.merge_axis_tracks(id, "ks:scaleX", "ks:scaleY");
        }
        Ok(())
    }

    fn convert_trim_to_dash(&mut self, id: ElementId) -> Result<()> {
        let element = self.doc.element(id);
        let has_static = element.has_property("stroke-dasharray")
            || element.has_property("stroke-dashoffset");
        let start_animated = element.timeline.has_keyframes("stroke-dasharray");
        let end_animated = element.timeline.has_keyframes("stroke-dashoffset");
        if !has_static && !start_animated && !end_animated {
            return Ok(());
        }
        let d = element.get_property("d").unwrap_or("").to_string();
        let length = path_data::total_length(&path_data::parse_path_data(&d)?);
        if length <= 0.0 {
            self.clear_dash_data(id);
            return Ok(());
        }

        let static_start: f64 = self
            .doc
            .element(id)
            .get_property("stroke-dasharray")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0);
        let static_end: f64 = self
            .doc
            .element(id)
            .get_property("stroke-dashoffset")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(1.0);

        if !start_animated && !end_animated {
            if static_start == 0.0 && static_end == 1.0 {
                // the full span draws the whole stroke, which is no dashing
                self.clear_dash_data(id);
                return Ok(());
            }
            let window = (static_end - static_start) * length;
            let element = self.doc.element_mut(id);
            element.set_property(
                "stroke-dasharray",
                format!("{} {}", fmt_number(window), fmt_number(length)),
            );
            element.set_property("stroke-dashoffset", fmt_number(-static_start * length));
            return Ok(());
        }

        let start_kfs: Vec<Keyframe> = self
            .doc
            .element(id)
            .timeline
            .keyframes("stroke-dasharray")
            .map(<[Keyframe]>::to_vec)
            .unwrap_or_default();
        let end_kfs: Vec<Keyframe> = self
            .doc
            .element(id)
            .timeline
            .keyframes("stroke-dashoffset")
            .map(<[Keyframe]>::to_vec)
            .unwrap_or_default();
        let first_start = start_kfs
            .first()
            .and_then(|kf| kf.value.trim().parse().ok())
            .unwrap_or(static_start);
        let first_end = end_kfs
            .first()
            .and_then(|kf| kf.value.trim().parse().ok())
            .unwrap_or(static_end);
        self.clear_dash_data(id);

        if start_animated {
            // a moving trim start becomes an animated dash offset with a
            // fixed window width
            let window = (first_end - first_start) * length;
            for kf in &start_kfs {
                let start: f64 = kf.value.trim().parse().unwrap_or(0.0);
                self.doc.element_mut(id).timeline.set_keyframe(
                    "stroke-dashoffset",
                    kf.time,
                    fmt_number(-start * length),
                    kf.easing.clone(),
                );
            }
            self.doc.element_mut(id).set_property(
                "stroke-dasharray",
                format!("{} {}", fmt_number(window), fmt_number(length)),
            );
        } else {
            // only the trim end moves: the window width itself animates
            for kf in &end_kfs {
                let end: f64 = kf.value.trim().parse().unwrap_or(1.0);
                let window = (end - static_start) * length;
                self.doc.element_mut(id).timeline.set_keyframe(
                    "stroke-dasharray",
                    kf.time,
                    format!("{} {}", fmt_number(window), fmt_number(length)),
                    kf.easing.clone(),
                );
            }
            self.doc
                .element_mut(id)
                .set_property("stroke-dashoffset", fmt_number(-static_start * length));
        }
        Ok(())
    }

    fn clear_dash_data(&mut self, id: ElementId) {
        for prop in ["stroke-dasharray", "stroke-dashoffset"] {
            let times: Vec<f64> = self
                .doc
                .element(id)
                .timeline
                .keyframes(prop)
                .map(|kfs| kfs.iter().map(|kf| kf.time).collect())
                .unwrap_or_default();
            for time in times {
                self.doc.element_mut(id).timeline.remove_keyframe(prop, time);
            }
            self.doc.element_mut(id).remove_property(prop);
        }
    }

    fn merge_axis_tracks(&mut self, id: ElementId, x_prop: &str, y_prop: &str) {
        let timeline = &self.doc.element(id).timeline;
        let (Some(x_kfs), Some(y_kfs)) = (timeline.keyframes(x_prop), timeline.keyframes(y_prop))
        else {
            return;
        };
        if x_kfs.len() != y_kfs.len() {
            return;
        }
        let aligned = x_kfs
            .iter()
            .zip(y_kfs)
            .all(|(a, b)| a.time == b.time && a.easing == b.easing);
        if !aligned || timeline.repeat(x_prop) != timeline.repeat(y_prop) {
            return;
        }
        let timeline = &mut self.doc.element_mut(id).timeline;
        timeline.set_separated(x_prop, false);
        timeline.set_separated(y_prop, false);
    }
}

/// Reads a custom easing from a nested `pathInterpolator`. `None` means no
/// interpolator child exists at all; unsupported shapes degrade to linear.
fn read_interpolator_from_child(node: &XmlNode) -> Option<String> {
    for child in &node.children {
        if child.tag != "aapt:attr"
            || child.attr("name") != Some("android:interpolator")
            || child.children.is_empty()
        {
            continue;
        }
        let interpolator = &child.children[0];
        if interpolator.tag != "pathInterpolator" {
            return Some("linear".to_string());
        }
        let Ok(cmds) = path_data::parse_path_data(interpolator.attr("android:pathData").unwrap_or(""))
        else {
            return Some("linear".to_string());
        };

        // step functions serialize as M0,0 L0,1 1,1 or M0,0 L1,0 1,1
        if cmds.len() == 3 {
            if let (
                PathCommand::MoveTo { x: mx, y: my },
                PathCommand::LineTo { x: x1, y: y1 },
                PathCommand::LineTo { x: x2, y: y2 },
            ) = (&cmds[0], &cmds[1], &cmds[2])
            {
                if *mx == 0.0 && *my == 0.0 && *x2 == 1.0 && *y2 == 1.0 {
                    if *x1 == 1.0 && *y1 == 0.0 {
                        return Some("steps(1)".to_string());
                    }
                    if *x1 == 0.0 && *y1 == 1.0 {
                        return Some("steps(1, start)".to_string());
                    }
                }
            }
        }

        if cmds.len() == 2 {
            if let (
                PathCommand::MoveTo { x: mx, y: my },
                PathCommand::CurveTo { x1, y1, x2, y2, x, y },
            ) = (&cmds[0], &cmds[1])
            {
                if *mx == 0.0 && *my == 0.0 && *x == 1.0 && *y == 1.0 {
                    return Some(format!(
                        "cubic-bezier({}, {}, {}, {})",
                        fmt_number(*x1),
                        fmt_number(*y1),
                        fmt_number(*x2),
                        fmt_number(*y2)
                    ));
                }
            }
        }
        return Some("linear".to_string());
    }
    None
}

fn fmt_number(value: f64) -> String {
    let rounded = (value * 1e4).round() / 1e4;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}
