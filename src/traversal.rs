//! Finding every trapezoid a new segment passes through before it is cut in.

use crate::{
    arena::TrapezoidId,
    error::PlannerError,
    geometry::{EPSILON, Segment},
    map::TrapezoidalMap,
    query::locate,
};

/// Returns the trapezoids intersected by `seg`, left to right, by locating
/// its left endpoint and then walking `upper_right`/`lower_right` neighbor
/// links until a trapezoid's `rightp` reaches `seg`'s right endpoint.
///
/// Grounded in `original_source/src/trapezoidal_map.cpp::findIntersectedTrapezoids`.
/// At each step, whether the segment continues through the upper or lower
/// neighbor is decided by whether the segment passes above or below the
/// current trapezoid's right vertex — the same `is_above` tie-break used
/// everywhere else, so a vertex exactly on the segment is always resolved the
/// same way.
///
/// `SPEC_FULL.md` §4.D bounds the walk at `4 * segment_count + 16` steps: a
/// well-formed map can never need more hops than that to cross it, so
/// exceeding the bound means the neighbor graph is corrupted rather than that
/// the input is unusually large.
pub fn follow(map: &TrapezoidalMap, seg: &Segment) -> Result<Vec<TrapezoidId>, PlannerError> {
    let limit = 4 * map.segment_count() + 16;
    let start = locate(map, map.root(), seg.left());
    let mut result = vec![start];
    let mut current = start;
    let mut steps = 0usize;

    while map.trapezoid(current).rightp.x < seg.right().x - EPSILON {
        steps += 1;
        if steps > limit {
            return Err(PlannerError::TraversalOverflow { segment: *seg, limit });
        }

        let rightp = map.trapezoid(current).rightp;
        let next = if seg.is_above(rightp) {
            map.trapezoid(current).lower_right
        } else {
            map.trapezoid(current).upper_right
        };
        let next = next.ok_or(PlannerError::NullNeighbor(current))?;
        if next == current {
            return Err(PlannerError::CircularNeighbor(current));
        }
        result.push(next);
        current = next;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use crate::geometry::Point;

    use super::*;

    #[test]
    fn a_segment_spanning_the_whole_map_intersects_exactly_one_trapezoid() {
        let map = crate::map::build_trapezoidal_map(&[]).unwrap();
        let seg = Segment::new(Point::new(-5.0, 0.0), Point::new(5.0, 0.0));
        let hit = follow(&map, &seg).unwrap();
        assert_eq!(hit.len(), 1);
    }

    #[test]
    fn following_a_second_segment_crosses_at_least_the_trapezoids_the_first_split_off() {
        let first = Segment::new(Point::new(-5.0, 0.0), Point::new(5.0, 0.0));
        let map = crate::map::build_trapezoidal_map_seeded(&[first], 7).unwrap();
        let second = Segment::new(Point::new(-5.0, 5.0), Point::new(5.0, 5.0));
        let hit = follow(&map, &second).unwrap();
        assert!(!hit.is_empty());
    }
}
