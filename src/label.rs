//! Edge label anchoring.
//!
//! Labels sit between the two "middle" bend points of a route instead of at
//! its true arc-length midpoint, which keeps them near the visual centre of
//! step routes without walking the path.

use crate::geometry::Point;

/// The bend points a label is centred on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MiddleBends {
    Pair(Point, Point),
    /// Only one bend exists; the pair arithmetic would index before the
    /// first bend, so the bend itself is the anchor.
    Single(Point),
}

impl MiddleBends {
    pub fn anchor(self) -> Point {
        match self {
            MiddleBends::Pair(a, b) => a.midpoint(b),
            MiddleBends::Single(p) => p,
        }
    }
}

/// Picks the middle bends with `first = floor(n/2) - 1` and
/// `last = ceil(n/2) - 1`. When both land on the same slot the pair shifts to
/// `(bends[last], bends[last + 1])`.
pub fn middle_bends(bends: &[Point]) -> Option<MiddleBends> {
    let count = bends.len();
    match count {
        0 => None,
        1 => Some(MiddleBends::Single(bends[0])),
        _ => {
            let first = count / 2 - 1;
            let last = count.div_ceil(2) - 1;
            let (a, b) = if first == last {
                (bends[last], bends[last + 1])
            } else {
                (bends[first], bends[last])
            };
            Some(MiddleBends::Pair(a, b))
        }
    }
}

/// Label anchor for a route.
pub fn place_label(start: Point, bends: &[Point], end: Point) -> Point {
    match middle_bends(bends) {
        Some(middle) => middle.anchor(),
        None => start.midpoint(end),
    }
}
