use crate::error::{Result, TranscodeError};

/// 2D affine transform in SVG matrix form (a b c d e f).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::identity()
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Returns `self * other`: `other` is applied first.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Absolute path command. The parser normalizes the full SVG alphabet
/// (relative forms, H/V, smooth S/T shorthands) down to these five. Arcs are
/// not handled: the host converts shapes to plain paths before export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    QuadTo { x1: f64, y1: f64, x: f64, y: f64 },
    CurveTo { x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64 },
    Close,
}

impl PathCommand {
    pub fn end_point(&self) -> Option<(f64, f64)> {
        match *self {
            PathCommand::MoveTo { x, y }
            | PathCommand::LineTo { x, y }
            | PathCommand::QuadTo { x, y, .. }
            | PathCommand::CurveTo { x, y, .. } => Some((x, y)),
            PathCommand::Close => None,
        }
    }
}

struct NumberReader<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> NumberReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
        }
    }

    fn skip_separators(&mut self) {
        while self
            .chars
            .peek()
            .is_some_and(|ch| ch.is_whitespace() || *ch == ',')
        {
            self.chars.next();
        }
    }

    fn peek_command(&mut self) -> Option<char> {
        self.skip_separators();
        self.chars.peek().copied().filter(|ch| ch.is_ascii_alphabetic())
    }

    fn next_command(&mut self) -> Option<char> {
        self.peek_command()?;
        self.chars.next()
    }

    fn has_number(&mut self) -> bool {
        self.skip_separators();
        matches!(self.chars.peek(), Some(ch) if ch.is_ascii_digit() || *ch == '-' || *ch == '+' || *ch == '.')
    }

    fn number(&mut self) -> Result<f64> {
        self.skip_separators();
        let mut buf = String::new();
        if matches!(self.chars.peek(), Some('-') | Some('+')) {
            buf.push(self.chars.next().unwrap());
        }
        while self
            .chars
            .peek()
            .is_some_and(|ch| ch.is_ascii_digit() || *ch == '.')
        {
            // a second '.' starts a new number ("1.5.5" is "1.5" ".5")
            if *self.chars.peek().unwrap() == '.' && buf.contains('.') {
                break;
            }
            buf.push(self.chars.next().unwrap());
        }
        if matches!(self.chars.peek(), Some('e') | Some('E')) {
            buf.push(self.chars.next().unwrap());
            if matches!(self.chars.peek(), Some('-') | Some('+')) {
                buf.push(self.chars.next().unwrap());
            }
            while self.chars.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                buf.push(self.chars.next().unwrap());
            }
        }
        buf.parse::<f64>()
            .map_err(|_| TranscodeError::invalid(format!("bad number in path data: '{buf}'")))
    }
}

/// Parses SVG path data into absolute commands.
pub fn parse_path_data(text: &str) -> Result<Vec<PathCommand>> {
    let mut reader = NumberReader::new(text);
    let mut commands = Vec::new();
    let mut cur = (0.0f64, 0.0f64);
    let mut subpath_start = (0.0f64, 0.0f64);
    // reflection points for smooth shorthands
    let mut last_cubic_ctrl: Option<(f64, f64)> = None;
    let mut last_quad_ctrl: Option<(f64, f64)> = None;
    let mut last_cmd = ' ';

    while let Some(cmd) = reader.next_command() {
        let relative = cmd.is_ascii_lowercase();
        let op = cmd.to_ascii_uppercase();
        loop {
            match op {
                'M' => {
                    let mut x = reader.number()?;
                    let mut y = reader.number()?;
                    if relative {
                        x += cur.0;
                        y += cur.1;
                    }
                    cur = (x, y);
                    subpath_start = cur;
                    commands.push(PathCommand::MoveTo { x, y });
                    // further coordinate pairs are implicit line-tos
                    while reader.has_number() {
                        let mut x = reader.number()?;
                        let mut y = reader.number()?;
                        if relative {
                            x += cur.0;
                            y += cur.1;
                        }
                        cur = (x, y);
                        commands.push(PathCommand::LineTo { x, y });
                    }
                    last_cubic_ctrl = None;
                    last_quad_ctrl = None;
                }
                'L' => {
                    let mut x = reader.number()?;
                    let mut y = reader.number()?;
                    if relative {
                        x += cur.0;
                        y += cur.1;
                    }
                    cur = (x, y);
                    commands.push(PathCommand::LineTo { x, y });
                    last_cubic_ctrl = None;
                    last_quad_ctrl = None;
                }
                'H' => {
                    let mut x = reader.number()?;
                    if relative {
                        x += cur.0;
                    }
                    cur = (x, cur.1);
                    commands.push(PathCommand::LineTo { x, y: cur.1 });
                    last_cubic_ctrl = None;
                    last_quad_ctrl = None;
                }
                'V' => {
                    let mut y = reader.number()?;
                    if relative {
                        y += cur.1;
                    }
                    cur = (cur.0, y);
                    commands.push(PathCommand::LineTo { x: cur.0, y });
                    last_cubic_ctrl = None;
                    last_quad_ctrl = None;
                }
                'C' | 'S' => {
                    let (x1, y1) = if op == 'C' {
                        let mut x1 = reader.number()?;
                        let mut y1 = reader.number()?;
                        if relative {
                            x1 += cur.0;
                            y1 += cur.1;
                        }
                        (x1, y1)
                    } else {
                        match (last_cmd, last_cubic_ctrl) {
                            ('C', Some((px, py))) | ('S', Some((px, py))) => {
                                (2.0 * cur.0 - px, 2.0 * cur.1 - py)
                            }
                            _ => cur,
                        }
                    };
                    let mut x2 = reader.number()?;
                    let mut y2 = reader.number()?;
                    let mut x = reader.number()?;
                    let mut y = reader.number()?;
                    if relative {
                        x2 += cur.0;
                        y2 += cur.1;
                        x += cur.0;
                        y += cur.1;
                    }
                    cur = (x, y);
                    last_cubic_ctrl = Some((x2, y2));
                    last_quad_ctrl = None;
                    commands.push(PathCommand::CurveTo { x1, y1, x2, y2, x, y });
                }
                'Q' | 'T' => {
                    let (x1, y1) = if op == 'Q' {
                        let mut x1 = reader.number()?;
                        let mut y1 = reader.number()?;
                        if relative {
                            x1 += cur.0;
                            y1 += cur.1;
                        }
                        (x1, y1)
                    } else {
                        match (last_cmd, last_quad_ctrl) {
                            ('Q', Some((px, py))) | ('T', Some((px, py))) => {
                                (2.0 * cur.0 - px, 2.0 * cur.1 - py)
                            }
                            _ => cur,
                        }
                    };
                    let mut x = reader.number()?;
                    let mut y = reader.number()?;
                    if relative {
                        x += cur.0;
                        y += cur.1;
                    }
                    cur = (x, y);
                    last_quad_ctrl = Some((x1, y1));
                    last_cubic_ctrl = None;
                    commands.push(PathCommand::QuadTo { x1, y1, x, y });
                }
                'Z' => {
                    cur = subpath_start;
                    commands.push(PathCommand::Close);
                    last_cubic_ctrl = None;
                    last_quad_ctrl = None;
                }
                other => {
                    return Err(TranscodeError::invalid(format!(
                        "unsupported path command: '{other}'"
                    )));
                }
            }
            last_cmd = op;
            if op == 'M' || op == 'Z' || !reader.has_number() {
                break;
            }
        }
    }
    Ok(commands)
}

fn fmt_num(value: f64) -> String {
    let rounded = (value * 1e4).round() / 1e4;
    if rounded == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{rounded}")
}

pub fn path_data_to_string(commands: &[PathCommand]) -> String {
    let mut out = String::new();
    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo { x, y } => {
                out.push('M');
                out.push_str(&fmt_num(x));
                out.push(',');
                out.push_str(&fmt_num(y));
            }
            PathCommand::LineTo { x, y } => {
                out.push('L');
                out.push_str(&fmt_num(x));
                out.push(',');
                out.push_str(&fmt_num(y));
            }
            PathCommand::QuadTo { x1, y1, x, y } => {
                out.push('Q');
                for (i, v) in [x1, y1, x, y].iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&fmt_num(*v));
                }
            }
            PathCommand::CurveTo { x1, y1, x2, y2, x, y } => {
                out.push('C');
                for (i, v) in [x1, y1, x2, y2, x, y].iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&fmt_num(*v));
                }
            }
            PathCommand::Close => out.push('Z'),
        }
    }
    out
}

pub fn transform(commands: &[PathCommand], matrix: &Matrix) -> Vec<PathCommand> {
    commands
        .iter()
        .map(|cmd| match *cmd {
            PathCommand::MoveTo { x, y } => {
                let (x, y) = matrix.apply(x, y);
                PathCommand::MoveTo { x, y }
            }
            PathCommand::LineTo { x, y } => {
                let (x, y) = matrix.apply(x, y);
                PathCommand::LineTo { x, y }
            }
            PathCommand::QuadTo { x1, y1, x, y } => {
                let (x1, y1) = matrix.apply(x1, y1);
                let (x, y) = matrix.apply(x, y);
                PathCommand::QuadTo { x1, y1, x, y }
            }
            PathCommand::CurveTo { x1, y1, x2, y2, x, y } => {
                let (x1, y1) = matrix.apply(x1, y1);
                let (x2, y2) = matrix.apply(x2, y2);
                let (x, y) = matrix.apply(x, y);
                PathCommand::CurveTo { x1, y1, x2, y2, x, y }
            }
            PathCommand::Close => PathCommand::Close,
        })
        .collect()
}

const CURVE_FLATTEN_STEPS: usize = 32;

fn dist(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

/// Total arc length of the path. Curves are measured by fixed-step
/// flattening, which is plenty for trim fraction conversion.
pub fn total_length(commands: &[PathCommand]) -> f64 {
    let mut len = 0.0;
    let mut cur = (0.0, 0.0);
    let mut subpath_start = (0.0, 0.0);
    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo { x, y } => {
                cur = (x, y);
                subpath_start = cur;
            }
            PathCommand::LineTo { x, y } => {
                len += dist(cur, (x, y));
                cur = (x, y);
            }
            PathCommand::QuadTo { x1, y1, x, y } => {
                let mut prev = cur;
                for i in 1..=CURVE_FLATTEN_STEPS {
                    let t = i as f64 / CURVE_FLATTEN_STEPS as f64;
                    let mt = 1.0 - t;
                    let px = mt * mt * cur.0 + 2.0 * mt * t * x1 + t * t * x;
                    let py = mt * mt * cur.1 + 2.0 * mt * t * y1 + t * t * y;
                    len += dist(prev, (px, py));
                    prev = (px, py);
                }
                cur = (x, y);
            }
            PathCommand::CurveTo { x1, y1, x2, y2, x, y } => {
                let mut prev = cur;
                for i in 1..=CURVE_FLATTEN_STEPS {
                    let t = i as f64 / CURVE_FLATTEN_STEPS as f64;
                    let mt = 1.0 - t;
                    let px = mt.powi(3) * cur.0
                        + 3.0 * mt * mt * t * x1
                        + 3.0 * mt * t * t * x2
                        + t.powi(3) * x;
                    let py = mt.powi(3) * cur.1
                        + 3.0 * mt * mt * t * y1
                        + 3.0 * mt * t * t * y2
                        + t.powi(3) * y;
                    len += dist(prev, (px, py));
                    prev = (px, py);
                }
                cur = (x, y);
            }
            PathCommand::Close => {
                len += dist(cur, subpath_start);
                cur = subpath_start;
            }
        }
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_absolute_and_relative() {
        let cmds = parse_path_data("M10,10 l5,0 L20,20 h-5 v2 z").unwrap();
        assert_eq!(
            cmds,
            vec![
                PathCommand::MoveTo { x: 10.0, y: 10.0 },
                PathCommand::LineTo { x: 15.0, y: 10.0 },
                PathCommand::LineTo { x: 20.0, y: 20.0 },
                PathCommand::LineTo { x: 15.0, y: 20.0 },
                PathCommand::LineTo { x: 15.0, y: 22.0 },
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn parses_smooth_curve_reflection() {
        let cmds = parse_path_data("M0,0 C0,10 10,10 10,0 S20,-10 20,0").unwrap();
        match cmds[2] {
            PathCommand::CurveTo { x1, y1, .. } => {
                assert_eq!((x1, y1), (10.0, -10.0));
            }
            _ => panic!("expected curve"),
        }
    }

    #[test]
    fn parses_implicit_lineto_after_move() {
        let cmds = parse_path_data("M0,0 10,0 10,10").unwrap();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[1], PathCommand::LineTo { x: 10.0, y: 0.0 });
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_path_data("M0,0 A1,1").is_err());
    }

    #[test]
    fn line_length_is_exact() {
        let cmds = parse_path_data("M0,0 L10,0 L10,10").unwrap();
        assert!((total_length(&cmds) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn close_adds_return_segment() {
        let cmds = parse_path_data("M0,0 L10,0 L10,10 Z").unwrap();
        let len = total_length(&cmds);
        assert!((len - (20.0 + (200.0f64).sqrt())).abs() < 1e-9);
    }

    #[test]
    fn transform_moves_all_points() {
        let cmds = parse_path_data("M0,0 C1,1 2,2 3,3").unwrap();
        let moved = transform(&cmds, &Matrix::translate(10.0, 20.0));
        assert_eq!(
            moved[1],
            PathCommand::CurveTo {
                x1: 11.0,
                y1: 21.0,
                x2: 12.0,
                y2: 22.0,
                x: 13.0,
                y: 23.0
            }
        );
    }

    #[test]
    fn to_string_round_trips() {
        let cmds = parse_path_data("M0,0 L10,0 Q15,5 20,0 C21,1 22,2 23,3 Z").unwrap();
        let text = path_data_to_string(&cmds);
        assert_eq!(parse_path_data(&text).unwrap(), cmds);
    }

    #[test]
    fn matrix_compose_order() {
        // translate then scale vs scale then translate
        let m = Matrix::scale(2.0, 2.0).multiply(&Matrix::translate(1.0, 0.0));
        assert_eq!(m.apply(0.0, 0.0), (2.0, 0.0));
        let m = Matrix::translate(1.0, 0.0).multiply(&Matrix::scale(2.0, 2.0));
        assert_eq!(m.apply(1.0, 0.0), (3.0, 0.0));
    }
}
