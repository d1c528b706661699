//! Static bidirectional tables between scene property names and Android
//! (animated) vector drawable property names.

/// How a property's values serialize on the Android side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Path,
    /// Colors carry no `android:valueType` attribute.
    Color,
}

impl ValueKind {
    pub fn android_value_type(self) -> Option<&'static str> {
        match self {
            ValueKind::Float => Some("floatType"),
            ValueKind::Path => Some("pathType"),
            ValueKind::Color => None,
        }
    }
}

/// Group id suffixes keeping the animation targets of one scene element
/// apart: the transform group, the anchor-compensation group, the path, and
/// the opacity-carrying root.
pub const SUFFIX_TRANSFORM: &str = "_t";
pub const SUFFIX_ANCHOR: &str = "_a";
pub const SUFFIX_PATH: &str = "_p";
pub const SUFFIX_OPACITY: &str = "_o";

/// Suffix for the synthetic inner group created when importing a nonzero
/// pivot.
pub const PIVOT_ID_SUFFIX: &str = "_p";

#[derive(Debug, Clone, Copy)]
pub struct PropertyMapping {
    pub scene_prop: &'static str,
    pub android_prop: &'static str,
    pub id_suffix: &'static str,
    pub value_kind: ValueKind,
    /// On import, the animation must target the synthetic pivot group
    /// rather than the outer group.
    pub pivot_relative: bool,
    /// On import, the track arrives as an independent axis and is a
    /// candidate for merging back with its sibling axis afterwards.
    pub separated_axis: bool,
}

const fn mapping(
    scene_prop: &'static str,
    android_prop: &'static str,
    id_suffix: &'static str,
    value_kind: ValueKind,
) -> PropertyMapping {
    PropertyMapping {
        scene_prop,
        android_prop,
        id_suffix,
        value_kind,
        pivot_relative: false,
        separated_axis: false,
    }
}

/// Export direction: scene keyframe track name to animator property name.
/// Skew is absent because the drawable format cannot express it.
pub const EXPORT_PROPERTIES: &[PropertyMapping] = &[
    mapping("ks:positionX", "translateX", SUFFIX_TRANSFORM, ValueKind::Float),
    mapping("ks:positionY", "translateY", SUFFIX_TRANSFORM, ValueKind::Float),
    mapping("ks:rotation", "rotation", SUFFIX_TRANSFORM, ValueKind::Float),
    mapping("ks:scaleX", "scaleX", SUFFIX_TRANSFORM, ValueKind::Float),
    mapping("ks:scaleY", "scaleY", SUFFIX_TRANSFORM, ValueKind::Float),
    mapping("ks:anchorX", "translateX", SUFFIX_ANCHOR, ValueKind::Float),
    mapping("ks:anchorY", "translateY", SUFFIX_ANCHOR, ValueKind::Float),
    mapping("fill", "fillColor", SUFFIX_PATH, ValueKind::Color),
    mapping("stroke", "strokeColor", SUFFIX_PATH, ValueKind::Color),
    mapping("stroke-width", "strokeWidth", SUFFIX_PATH, ValueKind::Float),
    mapping("stroke-opacity", "strokeAlpha", SUFFIX_PATH, ValueKind::Float),
    mapping("fill-opacity", "fillAlpha", SUFFIX_PATH, ValueKind::Float),
    mapping("d", "pathData", SUFFIX_PATH, ValueKind::Path),
    // dash properties are preprocessed into trim fractions before export
    mapping("stroke-dasharray", "trimPathStart", SUFFIX_PATH, ValueKind::Float),
    mapping("stroke-dashoffset", "trimPathEnd", SUFFIX_PATH, ValueKind::Float),
    // only the document root can animate opacity
    mapping("opacity", "alpha", SUFFIX_OPACITY, ValueKind::Float),
];

/// Import direction: animator property name to scene track. Anchor rows are
/// absent (pivot reconstruction synthesizes anchors), rotation maps to the
/// import-side name and the pivot-relative rows redirect to the synthetic
/// pivot group.
pub const IMPORT_PROPERTIES: &[PropertyMapping] = &[
    PropertyMapping {
        separated_axis: true,
        ..mapping("ks:positionX", "translateX", SUFFIX_TRANSFORM, ValueKind::Float)
    },
    PropertyMapping {
        separated_axis: true,
        ..mapping("ks:positionY", "translateY", SUFFIX_TRANSFORM, ValueKind::Float)
    },
    PropertyMapping {
        pivot_relative: true,
        ..mapping("ks:rotate", "rotation", SUFFIX_TRANSFORM, ValueKind::Float)
    },
    PropertyMapping {
        pivot_relative: true,
        separated_axis: true,
        ..mapping("ks:scaleX", "scaleX", SUFFIX_TRANSFORM, ValueKind::Float)
    },
    PropertyMapping {
        pivot_relative: true,
        separated_axis: true,
        ..mapping("ks:scaleY", "scaleY", SUFFIX_TRANSFORM, ValueKind::Float)
    },
    mapping("fill", "fillColor", SUFFIX_PATH, ValueKind::Color),
    mapping("stroke", "strokeColor", SUFFIX_PATH, ValueKind::Color),
    mapping("stroke-width", "strokeWidth", SUFFIX_PATH, ValueKind::Float),
    mapping("stroke-opacity", "strokeAlpha", SUFFIX_PATH, ValueKind::Float),
    mapping("fill-opacity", "fillAlpha", SUFFIX_PATH, ValueKind::Float),
    mapping("d", "pathData", SUFFIX_PATH, ValueKind::Path),
    mapping("stroke-dasharray", "trimPathStart", SUFFIX_PATH, ValueKind::Float),
    mapping("stroke-dashoffset", "trimPathEnd", SUFFIX_PATH, ValueKind::Float),
    mapping("opacity", "alpha", SUFFIX_OPACITY, ValueKind::Float),
];

pub fn export_mapping(scene_prop: &str) -> Option<&'static PropertyMapping> {
    EXPORT_PROPERTIES.iter().find(|m| m.scene_prop == scene_prop)
}

pub fn import_mapping(android_prop: &str) -> Option<&'static PropertyMapping> {
    IMPORT_PROPERTIES
        .iter()
        .find(|m| m.android_prop == android_prop)
}

pub fn fill_rule_to_android(value: &str) -> String {
    if value == "evenodd" {
        "evenOdd".to_string()
    } else {
        "nonZero".to_string()
    }
}

pub fn fill_rule_to_svg(value: &str) -> String {
    if value == "evenOdd" {
        "evenodd".to_string()
    } else {
        "nonzero".to_string()
    }
}

/// Android framework interpolator names and their closest cubic-bezier
/// approximations.
const NAMED_INTERPOLATORS: &[(&str, &str)] = &[
    ("linear", "linear"),
    ("linear_out_slow_in", "cubic-bezier(0, 0, 0.2, 1)"),
    ("accelerate_quad", "cubic-bezier(0.35, 0, 0.705, 0.395)"),
    ("accelerate_cubic", "cubic-bezier(0.54, 0, 0.685, 0.17)"),
    ("accelerate_quint", "cubic-bezier(0.675, 0, 0.77, 0)"),
    ("accelerate_decelerate", "cubic-bezier(0.375, 0, 0.63, 1)"),
    ("anticipate", "cubic-bezier(0.72, -0.30, 0.735, -0.115)"),
    ("anticipate_overshoot", "cubic-bezier(0.80, -0.675, 0.20, 1.675)"),
    ("bounce", "linear"),
    ("cycle", "linear"),
    ("decelerate_quad", "cubic-bezier(0.28, 0.55, 0.61, 1.0)"),
    ("decelerate_cubic", "cubic-bezier(0.295, 0.735, 0.39, 1.0)"),
    ("decelerate_quint", "cubic-bezier(0.24, 1.0, 0.31, 1.0)"),
    ("fast_out_linear_in", "cubic-bezier(0.4, 0, 1, 1)"),
    ("fast_out_slow_in", "cubic-bezier(0.4, 0, 0.2, 1)"),
    ("overshoot", "cubic-bezier(0.265, 0.885, 0.19, 1.385)"),
];

/// Maps an `android:interpolator` attribute value to an easing string. A
/// missing attribute means the platform default `accelerate_decelerate`; a
/// reference to an interpolator not in the table yields `None` (no easing
/// recorded).
pub fn interpolator_to_easing(attr: Option<&str>) -> Option<String> {
    let mut name = attr.unwrap_or("accelerate_decelerate");
    if let Some(rest) = name.strip_prefix("@android:interpolator/") {
        name = rest;
    } else if let Some(rest) = name.strip_prefix("@android:anim/") {
        name = rest.strip_suffix("_interpolator").unwrap_or(rest);
    }
    NAMED_INTERPOLATORS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, easing)| easing.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_lookup() {
        let m = export_mapping("ks:anchorX").unwrap();
        assert_eq!(m.android_prop, "translateX");
        assert_eq!(m.id_suffix, SUFFIX_ANCHOR);
        assert!(export_mapping("ks:skewX").is_none());
    }

    #[test]
    fn import_lookup_redirects_pivot_properties() {
        assert!(import_mapping("rotation").unwrap().pivot_relative);
        assert_eq!(import_mapping("rotation").unwrap().scene_prop, "ks:rotate");
        assert!(!import_mapping("translateX").unwrap().pivot_relative);
        assert!(import_mapping("pivotX").is_none());
    }

    #[test]
    fn value_types() {
        assert_eq!(
            export_mapping("d").unwrap().value_kind.android_value_type(),
            Some("pathType")
        );
        assert_eq!(
            export_mapping("fill").unwrap().value_kind.android_value_type(),
            None
        );
    }

    #[test]
    fn named_interpolators() {
        // absent attribute means the platform default, not linear
        assert_eq!(
            interpolator_to_easing(None).as_deref(),
            Some("cubic-bezier(0.375, 0, 0.63, 1)")
        );
        assert_eq!(
            interpolator_to_easing(Some("@android:interpolator/linear")).as_deref(),
            Some("linear")
        );
        assert_eq!(
            interpolator_to_easing(Some("@android:interpolator/fast_out_slow_in")).as_deref(),
            Some("cubic-bezier(0.4, 0, 0.2, 1)")
        );
        assert_eq!(
            interpolator_to_easing(Some("@android:anim/overshoot_interpolator")).as_deref(),
            Some("cubic-bezier(0.265, 0.885, 0.19, 1.385)")
        );
        // unknown framework reference: no easing at all
        assert_eq!(interpolator_to_easing(Some("@android:interpolator/spring")), None);
    }
}
