use once_cell::sync::Lazy;
use regex::Regex;

use crate::path_data::Matrix;

static RGB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*([0-9.]+)\s*,\s*([0-9.]+)\s*,\s*([0-9.]+)\s*(?:,\s*([-0-9.]+)\s*)?\)$")
        .unwrap()
});
static GRADIENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-ks-(linear|radial)-gradient\(\s*userSpaceOnUse\s+([^,]*?)\s*(?:matrix\(([^)]*)\))?\s*,\s*(.*)\)$")
        .unwrap()
});

/// Solid color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spread {
    Pad,
    Reflect,
    Repeat,
}

impl Spread {
    pub fn from_svg(token: &str) -> Spread {
        match token {
            "reflect" => Spread::Reflect,
            "repeat" => Spread::Repeat,
            _ => Spread::Pad,
        }
    }

    pub fn from_tile_mode(token: &str) -> Spread {
        match token {
            "mirror" => Spread::Reflect,
            "repeat" => Spread::Repeat,
            // "clamp" and "disabled" both pad
            _ => Spread::Pad,
        }
    }

    pub fn to_tile_mode(self) -> &'static str {
        match self {
            Spread::Pad => "clamp",
            Spread::Reflect => "mirror",
            Spread::Repeat => "repeat",
        }
    }

    pub fn to_svg(self) -> &'static str {
        match self {
            Spread::Pad => "pad",
            Spread::Reflect => "reflect",
            Spread::Repeat => "repeat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    Linear { x1: f64, y1: f64, x2: f64, y2: f64 },
    Radial { cx: f64, cy: f64, fx: f64, fy: f64, r: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    pub spread: Spread,
    pub transform: Matrix,
    pub stops: Vec<GradientStop>,
}

/// Parsed paint value of a fill or stroke property.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    None,
    Solid(Rgba),
    Gradient(Gradient),
}

fn parse_hex(text: &str) -> Option<Rgba> {
    let digits = text.strip_prefix('#')?;
    if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |hi: &str| u8::from_str_radix(hi, 16).ok().map(|v| v as f64 / 255.0);
    match digits.len() {
        3 => {
            let mut parts = digits.chars().map(|ch| {
                let v = ch.to_digit(16).unwrap() as f64;
                (v * 16.0 + v) / 255.0
            });
            Some(Rgba {
                red: parts.next()?,
                green: parts.next()?,
                blue: parts.next()?,
                alpha: 1.0,
            })
        }
        6 => Some(Rgba {
            red: byte(&digits[0..2])?,
            green: byte(&digits[2..4])?,
            blue: byte(&digits[4..6])?,
            alpha: 1.0,
        }),
        8 => Some(Rgba {
            alpha: byte(&digits[0..2])?,
            red: byte(&digits[2..4])?,
            green: byte(&digits[4..6])?,
            blue: byte(&digits[6..8])?,
        }),
        _ => None,
    }
}

fn parse_matrix(text: &str) -> Matrix {
    let vals: Vec<f64> = text
        .split_whitespace()
        .filter_map(|v| v.parse().ok())
        .collect();
    if vals.len() != 6 {
        return Matrix::identity();
    }
    Matrix {
        a: vals[0],
        b: vals[1],
        c: vals[2],
        d: vals[3],
        e: vals[4],
        f: vals[5],
    }
}

fn parse_stop(text: &str) -> Option<GradientStop> {
    let mut parts = text.split_whitespace();
    let color = parse_css_color(parts.next()?)?;
    let offset_text = parts.next().unwrap_or("0%");
    let offset = match offset_text.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok()? / 100.0,
        None => offset_text.parse::<f64>().ok()?,
    };
    Some(GradientStop { offset, color })
}

fn parse_css_color(text: &str) -> Option<Rgba> {
    if let Some(rgba) = parse_hex(text) {
        return Some(rgba);
    }
    let caps = RGB_RE.captures(text)?;
    let chan = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|v| (v / 255.0).clamp(0.0, 1.0))
    };
    Some(Rgba {
        red: chan(1)?,
        green: chan(2)?,
        blue: chan(3)?,
        alpha: caps
            .get(4)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(1.0)
            .clamp(0.0, 1.0),
    })
}

/// Parses a scene paint string: `none`, hex, `rgb()/rgba()`, or the
/// userSpaceOnUse `-ks-linear-gradient(...)` / `-ks-radial-gradient(...)`
/// forms the importer itself produces.
pub fn parse_paint(text: &str) -> Paint {
    let text = text.trim();
    if text.is_empty() || text == "none" {
        return Paint::None;
    }
    if let Some(caps) = GRADIENT_RE.captures(text) {
        let kind_token = caps.get(1).map_or("", |m| m.as_str());
        let geometry: Vec<&str> = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .split_whitespace()
            .collect();
        // the last geometry token is the spread method
        let (coords, spread) = match geometry.split_last() {
            Some((last, rest)) => (rest.to_vec(), Spread::from_svg(last)),
            None => (Vec::new(), Spread::Pad),
        };
        let num = |i: usize| {
            coords
                .get(i)
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(0.0)
        };
        let kind = if kind_token == "radial" {
            GradientKind::Radial {
                r: num(0),
                cx: num(1),
                cy: num(2),
                fx: num(3),
                fy: num(4),
            }
        } else {
            GradientKind::Linear {
                x1: num(0),
                y1: num(1),
                x2: num(2),
                y2: num(3),
            }
        };
        let transform = caps.get(3).map_or(Matrix::identity(), |m| parse_matrix(m.as_str()));
        let mut stops: Vec<GradientStop> = caps
            .get(4)
            .map_or("", |m| m.as_str())
            .split(',')
            .filter_map(|s| parse_stop(s.trim()))
            .collect();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        return Paint::Gradient(Gradient {
            kind,
            spread,
            transform,
            stops,
        });
    }
    match parse_css_color(text) {
        Some(rgba) => Paint::Solid(rgba),
        None => Paint::None,
    }
}

fn to_hex(component: f64) -> String {
    let val = (component * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("{val:02x}")
}

/// `#rrggbb`, or `#aarrggbb` when alpha differs from 1.
pub fn rgba_to_android(color: &Rgba) -> String {
    if color.alpha == 1.0 {
        format!(
            "#{}{}{}",
            to_hex(color.red),
            to_hex(color.green),
            to_hex(color.blue)
        )
    } else {
        format!(
            "#{}{}{}{}",
            to_hex(color.alpha),
            to_hex(color.red),
            to_hex(color.green),
            to_hex(color.blue)
        )
    }
}

/// Generates distinguishable stand-in colors for unresolvable resource and
/// theme references. Per-call state, never shared between imports.
#[derive(Debug, Default)]
pub struct PlaceholderColors {
    current: u32,
}

impl PlaceholderColors {
    pub fn next(&mut self) -> String {
        self.current += 0x40_40_40;
        if self.current > 0xff_ff_ff {
            self.current = 0x40_40_40;
        }
        format!("#{:06x}", self.current)
    }
}

/// Converts an Android color attribute value to a scene color string.
/// Resource/theme references become placeholder colors; `#aarrggbb` either
/// drops its alpha (`ignore_alpha`) or becomes an `rgba()` value; the fully
/// transparent `#00000000` maps to `none`.
pub fn android_color_to_svg(
    color: &str,
    ignore_alpha: bool,
    placeholders: &mut PlaceholderColors,
) -> String {
    if color.starts_with('@') || color.starts_with('?') {
        return placeholders.next();
    }
    if !color.starts_with('#') {
        return "#000000".to_string();
    }
    if color.len() == 7 {
        return color.to_string();
    }
    if color.len() > 7 && ignore_alpha {
        if color == "#00000000" {
            return "none".to_string();
        }
        return format!("#{}", &color[3..]);
    }
    let Ok(val) = u32::from_str_radix(&color[1..], 16) else {
        return "#000000".to_string();
    };
    let a = (val >> 24) & 255;
    let r = (val >> 16) & 255;
    let g = (val >> 8) & 255;
    let b = val & 255;
    let alpha = (a as f64 / 255.0 * 1000.0).round() / 1000.0;
    format!("rgba({r}, {g}, {b}, {alpha})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_to_android_hex() {
        let red = Rgba {
            red: 1.0,
            green: 0.0,
            blue: 0.0,
            alpha: 1.0,
        };
        assert_eq!(rgba_to_android(&red), "#ff0000");
        let half = Rgba { alpha: 0.5, ..red };
        // round(0.5 * 255) = 128 = 0x80
        assert_eq!(rgba_to_android(&half), "#80ff0000");
        let clear = Rgba { alpha: 0.0, ..red };
        assert_eq!(rgba_to_android(&clear), "#00ff0000");
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!(
            parse_paint("#ff0000"),
            Paint::Solid(Rgba {
                red: 1.0,
                green: 0.0,
                blue: 0.0,
                alpha: 1.0
            })
        );
        match parse_paint("#80ff0000") {
            Paint::Solid(c) => {
                assert!((c.alpha - 128.0 / 255.0).abs() < 1e-9);
                assert_eq!(c.red, 1.0);
            }
            other => panic!("unexpected paint: {other:?}"),
        }
        assert_eq!(parse_paint("none"), Paint::None);
    }

    #[test]
    fn parses_rgba_function() {
        match parse_paint("rgba(255, 0, 0, 0.5)") {
            Paint::Solid(c) => {
                assert_eq!(c.red, 1.0);
                assert_eq!(c.alpha, 0.5);
            }
            other => panic!("unexpected paint: {other:?}"),
        }
    }

    #[test]
    fn parses_linear_gradient_string() {
        let paint =
            parse_paint("-ks-linear-gradient(userSpaceOnUse 0 0 10 0 pad matrix(1 0 0 1 0 0), #ff0000 0%, #0000ff 100%)");
        match paint {
            Paint::Gradient(g) => {
                assert_eq!(
                    g.kind,
                    GradientKind::Linear {
                        x1: 0.0,
                        y1: 0.0,
                        x2: 10.0,
                        y2: 0.0
                    }
                );
                assert_eq!(g.spread, Spread::Pad);
                assert_eq!(g.stops.len(), 2);
                assert_eq!(g.stops[1].offset, 1.0);
            }
            other => panic!("unexpected paint: {other:?}"),
        }
    }

    #[test]
    fn parses_radial_gradient_string() {
        let paint = parse_paint(
            "-ks-radial-gradient(userSpaceOnUse 5 8 8 8 8 reflect matrix(1 0 0 1 0 0), #ffffff 0%, #000000 100%)",
        );
        match paint {
            Paint::Gradient(g) => {
                assert_eq!(
                    g.kind,
                    GradientKind::Radial {
                        r: 5.0,
                        cx: 8.0,
                        cy: 8.0,
                        fx: 8.0,
                        fy: 8.0
                    }
                );
                assert_eq!(g.spread, Spread::Reflect);
            }
            other => panic!("unexpected paint: {other:?}"),
        }
    }

    #[test]
    fn placeholder_colors_cycle() {
        let mut colors = PlaceholderColors::default();
        assert_eq!(colors.next(), "#404040");
        assert_eq!(colors.next(), "#808080");
        assert_eq!(colors.next(), "#c0c0c0");
        // adding the step to #c0c0c0 overflows white, so the cycle restarts
        assert_eq!(colors.next(), "#404040");
    }

    #[test]
    fn android_color_conversions() {
        let mut colors = PlaceholderColors::default();
        assert_eq!(android_color_to_svg("#102030", true, &mut colors), "#102030");
        assert_eq!(android_color_to_svg("#80102030", true, &mut colors), "#102030");
        assert_eq!(android_color_to_svg("#00000000", true, &mut colors), "none");
        assert_eq!(
            android_color_to_svg("#80102030", false, &mut colors),
            "rgba(16, 32, 48, 0.502)"
        );
        assert_eq!(android_color_to_svg("@color/brand", true, &mut colors), "#404040");
        assert_eq!(android_color_to_svg("?attr/tint", true, &mut colors), "#808080");
        assert_eq!(android_color_to_svg("blue", true, &mut colors), "#000000");
    }
}
