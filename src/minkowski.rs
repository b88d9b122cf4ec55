//! Minkowski sum of two convex polygons, used to grow an obstacle by a
//! robot's shape before handing it to [`crate::free_space::compute_free_space`].
//!
//! Grounded in `original_source/src/minkowski_sum.cpp`: normalize each
//! polygon to start at its lowest vertex in counter-clockwise order, then
//! merge their edges by polar angle with a two-pointer walk, same as the
//! standard convex Minkowski sum construction.

use crate::geometry::Point;
use crate::geometry::Polygon;

fn cross(a: Point, b: Point) -> f64 {
    a.x * b.y - a.y * b.x
}

fn signed_area(verts: &[Point]) -> f64 {
    let n = verts.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Rotates `poly`'s vertices to start at the lowest one (ties broken by x),
/// and reverses them if necessary so they run counter-clockwise.
fn normalize_polygon(poly: &Polygon) -> Vec<Point> {
    let verts = &poly.vertices;
    let n = verts.len();
    let start = (0..n)
        .min_by(|&i, &j| {
            verts[i]
                .y
                .partial_cmp(&verts[j].y)
                .unwrap()
                .then(verts[i].x.partial_cmp(&verts[j].x).unwrap())
        })
        .unwrap_or(0);

    let mut ordered: Vec<Point> = (0..n).map(|k| verts[(start + k) % n]).collect();
    if signed_area(&ordered) < 0.0 {
        ordered[1..].reverse();
    }
    ordered
}

/// Computes the Minkowski sum of two convex polygons.
///
/// Both inputs are assumed convex (the caller is responsible for that, per
/// `SPEC_FULL.md` §4.Aux — this crate does not validate convexity).
pub fn minkowski_sum(a: &Polygon, b: &Polygon) -> Polygon {
    let a = normalize_polygon(a);
    let b = normalize_polygon(b);
    let n = a.len();
    let m = b.len();
    if n == 0 || m == 0 {
        return Polygon::new(Vec::new());
    }

    let mut result = Vec::with_capacity(n + m);
    let mut current = a[0] + b[0];
    result.push(current);

    let mut i = 0;
    let mut j = 0;
    while i < n || j < m {
        let edge_a = (i < n).then(|| a[(i + 1) % n] - a[i]);
        let edge_b = (j < m).then(|| b[(j + 1) % m] - b[j]);
        let take_a = match (edge_a, edge_b) {
            (Some(ea), Some(eb)) => cross(ea, eb) >= 0.0,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        current = current + if take_a { edge_a.unwrap() } else { edge_b.unwrap() };
        if take_a {
            i += 1;
        } else {
            j += 1;
        }
        result.push(current);
    }

    if let (Some(&first), Some(&last)) = (result.first(), result.last()) {
        if result.len() > 1 && first.approx_eq(last) {
            result.pop();
        }
    }
    Polygon::new(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_of_two_triangles_has_at_most_six_vertices() {
        let a = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(1.0, 2.0)]);
        let b = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)]);
        let sum = minkowski_sum(&a, &b);
        assert!(sum.vertices.len() <= 6);
        assert!(sum.vertices.len() >= 3);
    }

    #[test]
    fn sum_is_convex_with_positive_signed_area() {
        let square = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]);
        let sum = minkowski_sum(&square, &square);
        assert!(signed_area(&sum.vertices) > 0.0);
    }
}
