use serde::{Deserialize, Serialize};

use crate::label::place_label;
use crate::path::{EdgePath, build_path};

/// A coordinate pair in rendering space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point halfway between `self` and `other`, computed as `a + (b - a) / 2`.
    pub fn midpoint(self, other: Point) -> Point {
        Point {
            x: self.x + (other.x - self.x) / 2.0,
            y: self.y + (other.y - self.y) / 2.0,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// One continuous orthogonal route between an edge's source and target.
///
/// Consecutive points (start, bends..., end) differ in exactly one axis. The
/// layout engine guarantees this; nothing downstream re-checks it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub start_point: Point,
    #[serde(default)]
    pub bend_points: Vec<Point>,
    pub end_point: Point,
}

impl Section {
    pub fn new(start_point: Point, bend_points: Vec<Point>, end_point: Point) -> Self {
        Self {
            start_point,
            bend_points,
            end_point,
        }
    }

    pub fn straight(start_point: Point, end_point: Point) -> Self {
        Self::new(start_point, Vec::new(), end_point)
    }

    /// Full vertex sequence: start, every bend, end.
    pub fn points(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.bend_points.len() + 2);
        points.push(self.start_point);
        points.extend_from_slice(&self.bend_points);
        points.push(self.end_point);
        points
    }

    pub fn to_path(&self, radius: f32) -> EdgePath {
        build_path(self.start_point, &self.bend_points, self.end_point, radius)
    }

    pub fn label_point(&self) -> Point {
        place_label(self.start_point, &self.bend_points, self.end_point)
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        for point in std::iter::once(&mut self.start_point)
            .chain(self.bend_points.iter_mut())
            .chain(std::iter::once(&mut self.end_point))
        {
            point.x += dx;
            point.y += dy;
        }
    }

    /// Axis-aligned bounds as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let mut min_x = self.start_point.x;
        let mut min_y = self.start_point.y;
        let mut max_x = min_x;
        let mut max_y = min_y;
        for point in self.bend_points.iter().chain(std::iter::once(&self.end_point)) {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        (min_x, min_y, max_x, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_is_halfway() {
        let mid = Point::new(0.0, 0.0).midpoint(Point::new(10.0, -4.0));
        assert_eq!(mid, Point::new(5.0, -2.0));
    }

    #[test]
    fn section_points_include_endpoints() {
        let section = Section::new(
            Point::new(0.0, 0.0),
            vec![Point::new(0.0, 10.0), Point::new(20.0, 10.0)],
            Point::new(20.0, 30.0),
        );
        let points = section.points();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], section.start_point);
        assert_eq!(points[3], section.end_point);
    }

    #[test]
    fn section_bounds_and_translate() {
        let mut section = Section::new(
            Point::new(5.0, 0.0),
            vec![Point::new(5.0, 10.0), Point::new(-5.0, 10.0)],
            Point::new(-5.0, 20.0),
        );
        assert_eq!(section.bounds(), (-5.0, 0.0, 5.0, 20.0));
        section.translate(5.0, 1.0);
        assert_eq!(section.bounds(), (0.0, 1.0, 10.0, 21.0));
    }

    #[test]
    fn section_deserializes_layout_engine_shape() {
        let raw = r#"{"startPoint":{"x":1,"y":2},"bendPoints":[{"x":1,"y":5}],"endPoint":{"x":4,"y":5}}"#;
        let section: Section = serde_json::from_str(raw).expect("section json");
        assert_eq!(section.bend_points, vec![Point::new(1.0, 5.0)]);

        let no_bends = r#"{"startPoint":{"x":0,"y":0},"endPoint":{"x":0,"y":9}}"#;
        let section: Section = serde_json::from_str(no_bends).expect("section json");
        assert!(section.bend_points.is_empty());
    }
}
