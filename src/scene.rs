use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path_data::{self, Matrix, PathCommand};

/// Index into the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f64,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
}

/// Repeat parameter of a keyframe track.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Repeat {
    #[default]
    None,
    /// Repeats until the given absolute time.
    Until(f64),
    Infinite,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub repeat: Repeat,
    /// Whether this axis track is stored independently of its sibling axis
    /// (e.g. positionX vs positionY) instead of sharing timing with it.
    #[serde(default)]
    pub separated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    tracks: BTreeMap<String, Track>,
}

impl Timeline {
    pub fn keyframe_names(&self) -> Vec<String> {
        self.tracks
            .iter()
            .filter(|(_, track)| !track.keyframes.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn has_keyframes(&self, property: &str) -> bool {
        self.tracks
            .get(property)
            .is_some_and(|t| !t.keyframes.is_empty())
    }

    pub fn keyframes(&self, property: &str) -> Option<&[Keyframe]> {
        self.tracks
            .get(property)
            .filter(|t| !t.keyframes.is_empty())
            .map(|t| t.keyframes.as_slice())
    }

    /// Inserts a keyframe keeping times strictly increasing; an existing
    /// keyframe at the same time is replaced.
    pub fn set_keyframe(&mut self, property: &str, time: f64, value: String, easing: Option<String>) {
        let track = self.tracks.entry(property.to_string()).or_default();
        match track
            .keyframes
            .iter()
            .position(|kf| kf.time >= time)
        {
            Some(pos) if track.keyframes[pos].time == time => {
                track.keyframes[pos].value = value;
                track.keyframes[pos].easing = easing;
            }
            Some(pos) => track.keyframes.insert(pos, Keyframe { time, value, easing }),
            None => track.keyframes.push(Keyframe { time, value, easing }),
        }
    }

    pub fn remove_keyframe(&mut self, property: &str, time: f64) {
        if let Some(track) = self.tracks.get_mut(property) {
            track.keyframes.retain(|kf| kf.time != time);
        }
    }

    pub fn repeat(&self, property: &str) -> Repeat {
        self.tracks.get(property).map_or(Repeat::None, |t| t.repeat)
    }

    pub fn set_repeat(&mut self, property: &str, repeat: Repeat) {
        self.tracks.entry(property.to_string()).or_default().repeat = repeat;
    }

    pub fn is_separated(&self, property: &str) -> bool {
        self.tracks.get(property).is_some_and(|t| t.separated)
    }

    pub fn set_separated(&mut self, property: &str, separated: bool) {
        self.tracks
            .entry(property.to_string())
            .or_default()
            .separated = separated;
    }

    /// Rewrites keyword easings to curves the export path understands:
    /// after this pass every easing is linear, cubic-bezier or steps.
    pub fn simplify_easings(&mut self, property: &str) {
        let Some(track) = self.tracks.get_mut(property) else {
            return;
        };
        for kf in &mut track.keyframes {
            let Some(easing) = kf.easing.as_deref() else {
                continue;
            };
            let simplified = match easing {
                "ease" => Some("cubic-bezier(0.25, 0.1, 0.25, 1)"),
                "ease-in" => Some("cubic-bezier(0.42, 0, 1, 1)"),
                "ease-out" => Some("cubic-bezier(0, 0, 0.58, 1)"),
                "ease-in-out" => Some("cubic-bezier(0.42, 0, 0.58, 1)"),
                "step-start" => Some("steps(1, start)"),
                "step-end" => Some("steps(1)"),
                _ => None,
            };
            if let Some(simplified) = simplified {
                kf.easing = Some(simplified.to_string());
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub tag_name: String,
    properties: BTreeMap<String, String>,
    pub timeline: Timeline,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
}

impl Element {
    fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            properties: BTreeMap::new(),
            timeline: Timeline::default(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn get_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn set_property(&mut self, name: &str, value: impl Into<String>) {
        self.properties.insert(name.to_string(), value.into());
    }

    pub fn remove_property(&mut self, name: &str) {
        self.properties.remove(name);
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

/// Arena-backed scene document. Stands in for the host editing application:
/// the transcoder only consumes the property/timeline surface below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    elements: Vec<Element>,
    root: ElementId,
}

impl Document {
    pub fn new() -> Self {
        Self {
            elements: vec![Element::new("svg")],
            root: ElementId(0),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn create_element(&mut self, tag_name: &str) -> ElementId {
        self.elements.push(Element::new(tag_name));
        ElementId(self.elements.len() - 1)
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.elements[child.0].parent = Some(parent);
        self.elements[parent.0].children.push(child);
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.0]
    }

    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.elements.len()).map(ElementId)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        self.element_ids()
            .find(|eid| self.element(*eid).get_property("id") == Some(id))
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.elements[id.0].children.clone()
    }

    /// Static transform of an element at the given time: translate by
    /// position, rotate, scale, then translate by the anchor point. Animated
    /// properties are sampled at `time` (held, not interpolated).
    pub fn transform_at(&self, id: ElementId, time: f64) -> Matrix {
        let px = self.sampled_number(id, "ks:positionX", time, 0.0);
        let py = self.sampled_number(id, "ks:positionY", time, 0.0);
        let rot = self.sampled_number(id, "ks:rotation", time, 0.0);
        let sx = self.sampled_number(id, "ks:scaleX", time, 1.0);
        let sy = self.sampled_number(id, "ks:scaleY", time, 1.0);
        let ax = self.sampled_number(id, "ks:anchorX", time, 0.0);
        let ay = self.sampled_number(id, "ks:anchorY", time, 0.0);
        Matrix::translate(px, py)
            .multiply(&Matrix::rotate(rot))
            .multiply(&Matrix::scale(sx, sy))
            .multiply(&Matrix::translate(ax, ay))
    }

    fn sampled_number(&self, id: ElementId, property: &str, time: f64, default: f64) -> f64 {
        let element = self.element(id);
        let text = match element.timeline.keyframes(property) {
            Some(kfs) => {
                let at_or_before = kfs.iter().rev().find(|kf| kf.time <= time);
                at_or_before.unwrap_or(&kfs[0]).value.clone()
            }
            None => match element.get_property(property) {
                Some(v) => v.to_string(),
                None => return default,
            },
        };
        text.trim().parse().unwrap_or(default)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes path keyframe values so command counts and kinds line up
/// across keyframes: everything becomes absolute, and when keyframes
/// disagree on the command at a slot, lines and quads are promoted to
/// cubics. Keyframes whose command counts differ are left untouched.
pub fn make_path_keyframes_interpolatable(keyframes: &[Keyframe]) -> Result<Vec<Keyframe>> {
    let mut parsed: Vec<Vec<PathCommand>> = Vec::with_capacity(keyframes.len());
    for kf in keyframes {
        parsed.push(path_data::parse_path_data(&kf.value)?);
    }
    let aligned = parsed
        .windows(2)
        .all(|pair| pair[0].len() == pair[1].len());
    if aligned && !parsed.is_empty() {
        let slots = parsed[0].len();
        for slot in 0..slots {
            let needs_cubic = parsed
                .iter()
                .any(|cmds| matches!(cmds[slot], PathCommand::CurveTo { .. }));
            let needs_quad = parsed
                .iter()
                .any(|cmds| matches!(cmds[slot], PathCommand::QuadTo { .. }));
            if !(needs_cubic || needs_quad) {
                continue;
            }
            for cmds in &mut parsed {
                let start = slot
                    .checked_sub(1)
                    .and_then(|prev| cmds[prev].end_point())
                    .unwrap_or((0.0, 0.0));
                cmds[slot] = promote(cmds[slot], start, needs_cubic);
            }
        }
    }
    Ok(keyframes
        .iter()
        .zip(parsed)
        .map(|(kf, cmds)| Keyframe {
            time: kf.time,
            value: path_data::path_data_to_string(&cmds),
            easing: kf.easing.clone(),
        })
        .collect())
}

fn promote(cmd: PathCommand, start: (f64, f64), to_cubic: bool) -> PathCommand {
    match cmd {
        PathCommand::LineTo { x, y } if to_cubic => {
            let (sx, sy) = start;
            PathCommand::CurveTo {
                x1: sx + (x - sx) / 3.0,
                y1: sy + (y - sy) / 3.0,
                x2: sx + 2.0 * (x - sx) / 3.0,
                y2: sy + 2.0 * (y - sy) / 3.0,
                x,
                y,
            }
        }
        PathCommand::LineTo { x, y } => {
            let (sx, sy) = start;
            PathCommand::QuadTo {
                x1: (sx + x) / 2.0,
                y1: (sy + y) / 2.0,
                x,
                y,
            }
        }
        PathCommand::QuadTo { x1, y1, x, y } if to_cubic => {
            let (sx, sy) = start;
            PathCommand::CurveTo {
                x1: sx + 2.0 * (x1 - sx) / 3.0,
                y1: sy + 2.0 * (y1 - sy) / 3.0,
                x2: x + 2.0 * (x1 - x) / 3.0,
                y2: y + 2.0 * (y1 - y) / 3.0,
                x,
                y,
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyframes_stay_sorted_and_unique() {
        let mut tl = Timeline::default();
        tl.set_keyframe("x", 200.0, "2".into(), None);
        tl.set_keyframe("x", 0.0, "0".into(), Some("linear".into()));
        tl.set_keyframe("x", 100.0, "1".into(), None);
        tl.set_keyframe("x", 100.0, "1b".into(), None);
        let kfs = tl.keyframes("x").unwrap();
        assert_eq!(kfs.len(), 3);
        assert_eq!(kfs[0].time, 0.0);
        assert_eq!(kfs[1].value, "1b");
        assert_eq!(kfs[2].time, 200.0);
    }

    #[test]
    fn simplify_easings_rewrites_keywords() {
        let mut tl = Timeline::default();
        tl.set_keyframe("x", 0.0, "0".into(), Some("ease-in-out".into()));
        tl.set_keyframe("x", 100.0, "1".into(), Some("cubic-bezier(0.1, 0.2, 0.3, 0.4)".into()));
        tl.simplify_easings("x");
        let kfs = tl.keyframes("x").unwrap();
        assert_eq!(kfs[0].easing.as_deref(), Some("cubic-bezier(0.42, 0, 0.58, 1)"));
        assert_eq!(
            kfs[1].easing.as_deref(),
            Some("cubic-bezier(0.1, 0.2, 0.3, 0.4)")
        );
    }

    #[test]
    fn document_tree_and_lookup() {
        let mut doc = Document::new();
        let g = doc.create_element("g");
        let p = doc.create_element("path");
        doc.append_child(doc.root(), g);
        doc.append_child(g, p);
        doc.element_mut(p).set_property("id", "leaf");
        assert_eq!(doc.get_element_by_id("leaf"), Some(p));
        assert_eq!(doc.element(p).parent(), Some(g));
        assert_eq!(doc.children(doc.root()), vec![g]);
    }

    #[test]
    fn transform_at_uses_keyframes_when_present() {
        let mut doc = Document::new();
        let g = doc.create_element("g");
        doc.append_child(doc.root(), g);
        doc.element_mut(g).set_property("ks:positionX", "5");
        doc.element_mut(g)
            .timeline
            .set_keyframe("ks:positionX", 0.0, "10".into(), None);
        let m = doc.transform_at(g, 0.0);
        assert_eq!(m.apply(0.0, 0.0), (10.0, 0.0));
    }

    #[test]
    fn path_keyframes_promote_lines_to_cubics() {
        let kfs = vec![
            Keyframe {
                time: 0.0,
                value: "M0,0 L10,0".into(),
                easing: None,
            },
            Keyframe {
                time: 100.0,
                value: "M0,0 C0,5 10,5 10,10".into(),
                easing: None,
            },
        ];
        let out = make_path_keyframes_interpolatable(&kfs).unwrap();
        assert!(out[0].value.contains('C'));
        assert!(!out[0].value.contains('L'));
    }

    #[test]
    fn scene_dump_round_trips_through_json() {
        let mut doc = Document::new();
        let p = doc.create_element("path");
        doc.append_child(doc.root(), p);
        doc.element_mut(p).set_property("d", "M0,0 L1,1");
        doc.element_mut(p)
            .timeline
            .set_keyframe("stroke-width", 0.0, "1".into(), None);
        doc.element_mut(p).timeline.set_repeat("stroke-width", Repeat::Infinite);
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.element(p).get_property("d"), Some("M0,0 L1,1"));
        assert_eq!(back.element(p).timeline.repeat("stroke-width"), Repeat::Infinite);
    }
}
