//! Point location: descending the search DAG to find the trapezoid
//! containing a query point.

use crate::{
    arena::{DagNode, NodeId, TrapezoidId},
    geometry::{EPSILON, Point},
    map::TrapezoidalMap,
};

/// Walks the search DAG from `root` to the leaf whose trapezoid contains `p`.
///
/// Iterative rather than recursive, per `original_source/src/trapezoidal_map.cpp::queryTrapezoidMap`:
/// the DAG can be as deep as the number of segments inserted, and there is no
/// reason to risk a stack overflow on pathological input when a loop does the
/// same work.
pub fn locate(map: &TrapezoidalMap, root: NodeId, p: Point) -> TrapezoidId {
    let mut current = root;
    loop {
        match map.node(current) {
            DagNode::X { point, left, right } => {
                current = if p.x < point.x - EPSILON { *left } else { *right };
            }
            DagNode::Y { segment, above, below } => {
                current = if map.segment(*segment).is_above(p) { *above } else { *below };
            }
            DagNode::Leaf { trapezoid } => return *trapezoid,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::Segment;

    use super::*;

    #[test]
    fn locate_on_an_empty_map_returns_the_bounding_trapezoid() {
        let map = crate::map::build_trapezoidal_map(&[]).unwrap();
        let found = locate(&map, map.root(), Point::new(0.0, 0.0));
        assert!(map.trapezoids().any(|(id, _)| id == found));
    }

    #[test]
    fn locate_above_and_below_a_single_segment_land_in_different_trapezoids() {
        let seg = Segment::new(Point::new(-10.0, 0.0), Point::new(10.0, 0.0));
        let map = crate::map::build_trapezoidal_map_seeded(&[seg], 1).unwrap();
        let above = locate(&map, map.root(), Point::new(0.0, 5.0));
        let below = locate(&map, map.root(), Point::new(0.0, -5.0));
        assert_ne!(above, below);
    }
}
