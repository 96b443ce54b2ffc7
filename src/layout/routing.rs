use crate::geometry::{Point, Section};
use crate::ir::Direction;

use super::NodeLayout;

/// Offsets below this are treated as aligned.
const ALIGN_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Bounds {
    pub(super) x: f32,
    pub(super) y: f32,
    pub(super) width: f32,
    pub(super) height: f32,
}

impl Bounds {
    fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    fn bottom(&self) -> f32 {
        self.y + self.height
    }

    fn right(&self) -> f32 {
        self.x + self.width
    }
}

impl From<&NodeLayout> for Bounds {
    fn from(node: &NodeLayout) -> Self {
        Self {
            x: node.x,
            y: node.y,
            width: node.width,
            height: node.height,
        }
    }
}

/// Orthogonal route between two placed nodes.
///
/// The route leaves the source on the flow side, turns in the channel half a
/// rank gap before the target and enters the target on the opposite side.
/// Returns `None` when the target does not lie further along the flow than
/// the source (back edges); those take the fallback renderer.
///
/// With [`Direction::Right`] and a target above the source, the first bend
/// turns upward and stays sharp, and the second bend is classified as a
/// left turn whose approach point lies one radius beyond the bend. The
/// rounded path overshoots there and curves back.
pub(super) fn step_section(
    from: Bounds,
    to: Bounds,
    direction: Direction,
    rank_spacing: f32,
) -> Option<Section> {
    match direction {
        Direction::Down => {
            let start = Point::new(from.center_x(), from.bottom());
            let mut end = Point::new(to.center_x(), to.y);
            let gap = end.y - start.y;
            if gap <= 0.0 {
                return None;
            }
            if (end.x - start.x).abs() <= ALIGN_EPSILON {
                end.x = start.x;
                return Some(Section::straight(start, end));
            }
            let channel = channel_offset(gap, rank_spacing);
            let y = end.y - channel;
            Some(Section::new(
                start,
                vec![Point::new(start.x, y), Point::new(end.x, y)],
                end,
            ))
        }
        Direction::Right => {
            let start = Point::new(from.right(), from.center_y());
            let mut end = Point::new(to.x, to.center_y());
            let gap = end.x - start.x;
            if gap <= 0.0 {
                return None;
            }
            if (end.y - start.y).abs() <= ALIGN_EPSILON {
                end.y = start.y;
                return Some(Section::straight(start, end));
            }
            let channel = channel_offset(gap, rank_spacing);
            let x = end.x - channel;
            Some(Section::new(
                start,
                vec![Point::new(x, start.y), Point::new(x, end.y)],
                end,
            ))
        }
    }
}

// Distance from the target to the turning channel. Long edges turn half a
// rank gap before the target; short gaps turn halfway.
fn channel_offset(gap: f32, rank_spacing: f32) -> f32 {
    if rank_spacing > 0.0 && gap >= rank_spacing {
        rank_spacing / 2.0
    } else {
        gap / 2.0
    }
}

/// Unsmoothed step polyline used for edges the layout did not route.
pub(crate) fn fallback_points(from: &NodeLayout, to: &NodeLayout, direction: Direction) -> Vec<Point> {
    if from.id == to.id {
        return self_loop_points(Bounds::from(from));
    }
    let from = Bounds::from(from);
    let to = Bounds::from(to);
    let points = match direction {
        Direction::Down => {
            let start = Point::new(from.center_x(), from.bottom());
            let end = Point::new(to.center_x(), to.y);
            let mid_y = start.y + (end.y - start.y) / 2.0;
            vec![
                start,
                Point::new(start.x, mid_y),
                Point::new(end.x, mid_y),
                end,
            ]
        }
        Direction::Right => {
            let start = Point::new(from.right(), from.center_y());
            let end = Point::new(to.x, to.center_y());
            let mid_x = start.x + (end.x - start.x) / 2.0;
            vec![
                start,
                Point::new(mid_x, start.y),
                Point::new(mid_x, end.y),
                end,
            ]
        }
    };
    compress_path(&points)
}

// Small loop hanging off the right side of the box.
fn self_loop_points(node: Bounds) -> Vec<Point> {
    let reach = (node.height / 2.0).max(12.0);
    let top = node.center_y() - node.height / 4.0;
    let bottom = node.center_y() + node.height / 4.0;
    let out = node.right() + reach;
    vec![
        Point::new(node.right(), top),
        Point::new(out, top),
        Point::new(out, bottom),
        Point::new(node.right(), bottom),
    ]
}

/// Drops repeated points and interior points that continue a straight run.
pub(crate) fn compress_path(points: &[Point]) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    out.push(points[0]);
    for idx in 1..points.len() - 1 {
        let prev = out[out.len() - 1];
        let curr = points[idx];
        if (curr.x - prev.x).abs() <= 1e-4 && (curr.y - prev.y).abs() <= 1e-4 {
            continue;
        }
        let next = points[idx + 1];
        let dx1 = curr.x - prev.x;
        let dy1 = curr.y - prev.y;
        let dx2 = next.x - curr.x;
        let dy2 = next.y - curr.y;
        if (dx1.abs() <= 1e-4 && dx2.abs() <= 1e-4) || (dy1.abs() <= 1e-4 && dy2.abs() <= 1e-4) {
            continue;
        }
        out.push(curr);
    }
    let last = points[points.len() - 1];
    let tail = out[out.len() - 1];
    if (last.x - tail.x).abs() > 1e-4 || (last.y - tail.y).abs() > 1e-4 {
        out.push(last);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{Corner, classify_corner};

    fn bounds(x: f32, y: f32) -> Bounds {
        Bounds {
            x,
            y,
            width: 150.0,
            height: 35.0,
        }
    }

    #[test]
    fn aligned_nodes_route_straight() {
        let section = step_section(bounds(0.0, 0.0), bounds(0.0, 115.0), Direction::Down, 80.0)
            .expect("routed");
        assert!(section.bend_points.is_empty());
        assert_eq!(section.start_point, Point::new(75.0, 35.0));
        assert_eq!(section.end_point, Point::new(75.0, 115.0));
    }

    #[test]
    fn offset_nodes_route_through_channel() {
        let section = step_section(bounds(0.0, 0.0), bounds(230.0, 115.0), Direction::Down, 80.0)
            .expect("routed");
        assert_eq!(
            section.bend_points,
            vec![Point::new(75.0, 75.0), Point::new(305.0, 75.0)]
        );
        let points = section.points();
        assert_eq!(classify_corner(points[0], points[1], points[2]), Corner::LeftTurn);
        assert_eq!(classify_corner(points[1], points[2], points[3]), Corner::DownFromLeft);
    }

    #[test]
    fn long_edges_turn_just_above_target() {
        // Two ranks below: gap is 195, channel sits 40 above the target.
        let section = step_section(bounds(230.0, 0.0), bounds(0.0, 230.0), Direction::Down, 80.0)
            .expect("routed");
        assert_eq!(section.bend_points[0], Point::new(305.0, 190.0));
        let points = section.points();
        assert_eq!(classify_corner(points[0], points[1], points[2]), Corner::RightTurn);
        assert_eq!(classify_corner(points[1], points[2], points[3]), Corner::DownFromRight);
    }

    #[test]
    fn back_edges_are_not_routed() {
        assert!(step_section(bounds(0.0, 200.0), bounds(0.0, 0.0), Direction::Down, 80.0).is_none());
        assert!(step_section(bounds(300.0, 0.0), bounds(0.0, 0.0), Direction::Right, 80.0).is_none());
    }

    #[test]
    fn right_direction_uses_vertical_channel() {
        let section = step_section(bounds(0.0, 0.0), bounds(300.0, 100.0), Direction::Right, 80.0)
            .expect("routed");
        assert_eq!(section.start_point, Point::new(150.0, 17.5));
        assert_eq!(section.end_point, Point::new(300.0, 117.5));
        assert_eq!(
            section.bend_points,
            vec![Point::new(260.0, 17.5), Point::new(260.0, 117.5)]
        );
    }

    #[test]
    fn right_direction_upward_route_overshoots_second_bend() {
        let section = step_section(bounds(0.0, 100.0), bounds(300.0, 0.0), Direction::Right, 80.0)
            .expect("routed");
        assert_eq!(
            section.bend_points,
            vec![Point::new(260.0, 117.5), Point::new(260.0, 17.5)]
        );
        let points = section.points();
        assert_eq!(classify_corner(points[0], points[1], points[2]), Corner::Unclassified);
        assert_eq!(classify_corner(points[1], points[2], points[3]), Corner::LeftTurn);
        assert_eq!(
            section.to_path(4.0).to_string(),
            "M150,117.5 L260,117.5 L260,13.5 Q260,17.5 264,17.5 L300,17.5"
        );
    }

    fn node(id: &str, x: f32, y: f32) -> NodeLayout {
        NodeLayout {
            id: id.to_string(),
            x,
            y,
            width: 150.0,
            height: 35.0,
            label: crate::layout::TextBlock {
                lines: vec![id.to_string()],
                width: 10.0,
                height: 14.0,
            },
            data: None,
        }
    }

    #[test]
    fn fallback_steps_through_mid_rank() {
        let points = fallback_points(&node("a", 0.0, 0.0), &node("b", 230.0, 115.0), Direction::Down);
        assert_eq!(
            points,
            vec![
                Point::new(75.0, 35.0),
                Point::new(75.0, 75.0),
                Point::new(305.0, 75.0),
                Point::new(305.0, 115.0),
            ]
        );
        // Back edges still get a polyline, it just runs upward.
        let back = fallback_points(&node("b", 0.0, 200.0), &node("a", 0.0, 0.0), Direction::Down);
        assert_eq!(back, vec![Point::new(75.0, 235.0), Point::new(75.0, 0.0)]);
    }

    #[test]
    fn fallback_self_loop_stays_beside_node() {
        let a = node("a", 0.0, 0.0);
        let points = fallback_points(&a, &a, Direction::Down);
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| p.x >= 150.0));
        assert_ne!(points[0], points[3]);
    }

    #[test]
    fn compress_drops_duplicates_and_collinear_runs() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
        ];
        assert_eq!(
            compress_path(&points),
            vec![Point::new(0.0, 0.0), Point::new(0.0, 10.0), Point::new(10.0, 10.0)]
        );
    }
}
