//! Planar geometry primitives: points, oriented segments, and polygons.
//!
//! Every tolerance-sensitive comparison in the crate goes through the
//! constants and predicates defined here, per the uniform-epsilon contract
//! in `SPEC_FULL.md` §9.

use std::ops::{Add, Mul, Neg, Sub};

use itertools::Itertools;

/// Absolute tolerance used for every coordinate comparison in the crate.
pub const EPSILON: f64 = 1e-9;

/// A point in the plane.
///
/// `Point` intentionally does not implement `PartialEq`/`PartialOrd` against
/// float tolerance: bit-exact float equality is occasionally exactly what's
/// wanted (e.g. "is this still the same corner point I assigned a moment
/// ago"), and epsilon-tolerant geometric equality is a different relation
/// entirely. Use [`Point::approx_eq`] and [`Point::lex_lt`] for the latter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Epsilon-tolerant equality: `|Δx| < ε ∧ |Δy| < ε`.
    pub fn approx_eq(self, other: Point) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }

    /// Lexicographic order (x then y), with an epsilon-tolerant x comparison
    /// so points that differ only by rounding noise in x fall back to y.
    pub fn lex_lt(self, other: Point) -> bool {
        if (self.x - other.x).abs() > EPSILON { self.x < other.x } else { self.y < other.y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        self + (-rhs)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// An oriented segment, always normalized so `p1` is the lexicographically
/// smaller endpoint (see [`Point::lex_lt`]).
///
/// `obstacle_id` is `-1` for the bounding frame and the index of the source
/// polygon for everything else.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub p1: Point,
    pub p2: Point,
    pub obstacle_id: i32,
}

impl Segment {
    /// Builds a segment with no obstacle association (`obstacle_id = -1`),
    /// normalizing endpoint order.
    pub fn new(a: Point, b: Point) -> Self {
        Segment::with_obstacle(a, b, -1)
    }

    pub fn with_obstacle(a: Point, b: Point, obstacle_id: i32) -> Self {
        let (p1, p2) = if b.lex_lt(a) { (b, a) } else { (a, b) };
        Segment { p1, p2, obstacle_id }
    }

    pub fn left(&self) -> Point {
        self.p1
    }

    pub fn right(&self) -> Point {
        self.p2
    }

    /// `true` iff `p` lies strictly above the line through the segment, using
    /// the sign of the cross product `(right−left) × (p−left)`. Points within
    /// `EPSILON` of the line (including exactly on it) count as "below" —
    /// this tie-break is what keeps point location deterministic for points
    /// shared with a segment.
    pub fn is_above(&self, p: Point) -> bool {
        let (left, right) = (self.p1, self.p2);
        let cross = (right.x - left.x) * (p.y - left.y) - (right.y - left.y) * (p.x - left.x);
        cross > EPSILON
    }

    /// Linear interpolation of the segment's y-coordinate at `x`. Vertical
    /// segments (`|Δx| < ε`) return `f64::INFINITY`; callers must never use a
    /// vertical segment as a trapezoid `top`/`bottom`.
    pub fn y_at(&self, x: f64) -> f64 {
        let dx = self.p2.x - self.p1.x;
        if dx.abs() < EPSILON {
            return f64::INFINITY;
        }
        let t = (x - self.p1.x) / dx;
        self.p1.y + t * (self.p2.y - self.p1.y)
    }
}

/// An ordered vertex ring. The core does not require any particular
/// orientation; [`extract_edges`] just walks consecutive pairs.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Polygon { vertices }
    }
}

/// Extracts one segment per consecutive vertex pair (wrapping around) from
/// every polygon, tagging each with its polygon's index. Polygons with fewer
/// than three vertices are degenerate input: they are skipped, with a warning
/// logged, rather than failing the whole batch.
pub fn extract_edges(polygons: &[Polygon]) -> Vec<Segment> {
    let mut edges = Vec::new();
    for (poly_idx, poly) in polygons.iter().enumerate() {
        if poly.vertices.len() < 3 {
            log::warn!(
                "polygon {poly_idx} has fewer than 3 vertices ({}); skipping",
                poly.vertices.len()
            );
            continue;
        }
        for (a, b) in poly.vertices.iter().copied().circular_tuple_windows() {
            edges.push(Segment::with_obstacle(a, b, poly_idx as i32));
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn segment_normalizes_left_to_right() {
        let s = Segment::new(Point::new(5.0, 0.0), Point::new(1.0, 0.0));
        assert_eq!(s.p1.x, 1.0);
        assert_eq!(s.p2.x, 5.0);
    }

    #[test]
    fn vertical_segment_y_at_is_infinite() {
        let s = Segment::new(Point::new(3.0, 0.0), Point::new(3.0, 10.0));
        assert_eq!(s.y_at(3.0), f64::INFINITY);
    }

    #[test_case(Point::new(5.0, 10.0), true; "clearly above")]
    #[test_case(Point::new(5.0, -10.0), false; "clearly below")]
    #[test_case(Point::new(5.0, 0.0), false; "on the segment counts as below")]
    fn is_above_tie_breaks_on_the_line(p: Point, expected: bool) {
        let s = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(s.is_above(p), expected);
    }

    #[test]
    fn extract_edges_skips_degenerate_polygons_but_keeps_the_rest() {
        let triangle = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)]);
        let degenerate = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        let edges = extract_edges(&[triangle, degenerate]);
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|e| e.obstacle_id == 0));
    }
}
