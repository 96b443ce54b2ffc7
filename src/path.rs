//! Rounded step paths.
//!
//! Converts an orthogonal polyline (start, bends, end) into a path where every
//! bend is replaced by a quarter-round corner drawn as a quadratic curve with
//! the bend itself as control point.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::geometry::Point;

pub const DEFAULT_CORNER_RADIUS: f32 = 4.0;

/// A single drawing command of an edge path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { control: Point, to: Point },
}

impl PathCommand {
    /// Point the pen ends on after this command.
    pub fn end(&self) -> Point {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => p,
            PathCommand::QuadTo { to, .. } => to,
        }
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathCommand::MoveTo(p) => write!(f, "M{},{}", num(p.x), num(p.y)),
            PathCommand::LineTo(p) => write!(f, "L{},{}", num(p.x), num(p.y)),
            PathCommand::QuadTo { control, to } => write!(
                f,
                "Q{},{} {},{}",
                num(control.x),
                num(control.y),
                num(to.x),
                num(to.y)
            ),
        }
    }
}

// Normalise negative zero so "-0" never reaches the output.
fn num(v: f32) -> f32 {
    if v == 0.0 { 0.0 } else { v }
}

/// Ordered list of path commands for one edge.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct EdgePath {
    commands: Vec<PathCommand>,
}

impl EdgePath {
    pub fn new(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// End point of every command, in drawing order.
    pub fn points(&self) -> Vec<Point> {
        self.commands.iter().map(PathCommand::end).collect()
    }
}

impl fmt::Display for EdgePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, command) in self.commands.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{command}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathParseError {
    #[error("unknown path command `{0}`")]
    UnknownCommand(char),
    #[error("expected a coordinate pair after `{command}`, found `{found}`")]
    BadCoordinate { command: char, found: String },
    #[error("path is missing coordinates after `{0}`")]
    MissingCoordinate(char),
}

impl FromStr for EdgePath {
    type Err = PathParseError;

    /// Parses the `M x,y` / `L x,y` / `Q cx,cy x,y` mini-language written by
    /// [`EdgePath`]'s `Display` impl. A space between the command letter and
    /// its first pair is accepted.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut tokens = input.split_whitespace();
        let mut commands = Vec::new();
        while let Some(token) = tokens.next() {
            let mut chars = token.chars();
            let Some(letter) = chars.next() else {
                continue;
            };
            let rest = chars.as_str();
            let mut next_pair = |inline: &str| -> Result<Point, PathParseError> {
                let raw = if inline.is_empty() {
                    tokens.next().ok_or(PathParseError::MissingCoordinate(letter))?
                } else {
                    inline
                };
                parse_pair(letter, raw)
            };
            let command = match letter {
                'M' => PathCommand::MoveTo(next_pair(rest)?),
                'L' => PathCommand::LineTo(next_pair(rest)?),
                'Q' => {
                    let control = next_pair(rest)?;
                    let to = next_pair("")?;
                    PathCommand::QuadTo { control, to }
                }
                other => return Err(PathParseError::UnknownCommand(other)),
            };
            commands.push(command);
        }
        Ok(EdgePath { commands })
    }
}

fn parse_pair(command: char, raw: &str) -> Result<Point, PathParseError> {
    let bad = || PathParseError::BadCoordinate {
        command,
        found: raw.to_string(),
    };
    let (x, y) = raw.trim_end_matches(',').split_once(',').ok_or_else(bad)?;
    let x = x.trim().parse::<f32>().map_err(|_| bad())?;
    let y = y.trim().parse::<f32>().map_err(|_| bad())?;
    Ok(Point::new(x, y))
}

/// Shape of a bend relative to its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Corner {
    /// Vertical travel turning rightward (`next.x > v.x`).
    LeftTurn,
    /// Vertical travel turning leftward (`next.x < v.x`).
    RightTurn,
    /// Leftward horizontal travel turning down.
    DownFromRight,
    /// Rightward horizontal travel turning down.
    DownFromLeft,
    /// Anything else, including horizontal travel turning up.
    Unclassified,
}

pub fn classify_corner(prev: Point, v: Point, next: Point) -> Corner {
    if v.x == prev.x && next.x > v.x {
        Corner::LeftTurn
    } else if v.x == prev.x && next.x < v.x {
        Corner::RightTurn
    } else if v.y == prev.y && next.y > v.y {
        if v.x < prev.x {
            Corner::DownFromRight
        } else {
            Corner::DownFromLeft
        }
    } else {
        Corner::Unclassified
    }
}

/// Radius and clamping applied at every bend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerStyle {
    pub radius: f32,
    /// Limit the radius to half of the shorter adjacent segment.
    pub clamp: bool,
}

impl Default for CornerStyle {
    fn default() -> Self {
        Self {
            radius: DEFAULT_CORNER_RADIUS,
            clamp: false,
        }
    }
}

impl CornerStyle {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            clamp: false,
        }
    }

    pub fn clamped(radius: f32) -> Self {
        Self {
            radius,
            clamp: true,
        }
    }

    fn radius_at(&self, prev: Point, v: Point, next: Point) -> f32 {
        let radius = if self.radius.is_finite() {
            self.radius.max(0.0)
        } else {
            0.0
        };
        if !self.clamp {
            return radius;
        }
        let incoming = axis_distance(prev, v);
        let outgoing = axis_distance(v, next);
        radius.min(incoming / 2.0).min(outgoing / 2.0)
    }
}

// Segments are axis-aligned, so the larger axis delta is the length.
fn axis_distance(a: Point, b: Point) -> f32 {
    (b.x - a.x).abs().max((b.y - a.y).abs())
}

/// Builds a rounded step path with a fixed corner radius.
pub fn build_path(start: Point, bends: &[Point], end: Point, radius: f32) -> EdgePath {
    build_path_with(start, bends, end, CornerStyle::new(radius))
}

pub fn build_path_with(start: Point, bends: &[Point], end: Point, style: CornerStyle) -> EdgePath {
    let mut commands = Vec::with_capacity(2 + bends.len() * 2);
    commands.push(PathCommand::MoveTo(start));
    for (idx, &v) in bends.iter().enumerate() {
        let prev = if idx == 0 { start } else { bends[idx - 1] };
        let next = bends.get(idx + 1).copied().unwrap_or(end);
        let corner = classify_corner(prev, v, next);
        tracing::trace!(?corner, x = v.x, y = v.y, "classified bend");
        push_corner(&mut commands, corner, v, style.radius_at(prev, v, next));
    }
    commands.push(PathCommand::LineTo(end));
    EdgePath { commands }
}

fn push_corner(commands: &mut Vec<PathCommand>, corner: Corner, v: Point, r: f32) {
    let (approach, exit) = match corner {
        Corner::LeftTurn => (Point::new(v.x, v.y - r), Point::new(v.x + r, v.y)),
        Corner::RightTurn => (Point::new(v.x, v.y - r), Point::new(v.x - r, v.y)),
        Corner::DownFromRight => (Point::new(v.x + r, v.y), Point::new(v.x, v.y + r)),
        Corner::DownFromLeft => (Point::new(v.x - r, v.y), Point::new(v.x, v.y + r)),
        Corner::Unclassified => {
            commands.push(PathCommand::LineTo(v));
            return;
        }
    };
    commands.push(PathCommand::LineTo(approach));
    commands.push(PathCommand::QuadTo {
        control: v,
        to: exit,
    });
}

/// Plain polyline through `points` with no corner smoothing.
pub fn polyline_path(points: &[Point]) -> EdgePath {
    let mut commands = Vec::with_capacity(points.len());
    for (idx, &p) in points.iter().enumerate() {
        if idx == 0 {
            commands.push(PathCommand::MoveTo(p));
        } else {
            commands.push(PathCommand::LineTo(p));
        }
    }
    EdgePath { commands }
}
