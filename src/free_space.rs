//! Filtering the trapezoidal map down to free space: marking every
//! trapezoid that falls inside an obstacle so the roadmap builder and path
//! query can skip it.
//!
//! Grounded in `original_source/src/compute_free_space.cpp`. A trapezoid is
//! obstacle interior exactly when its top and bottom bounding segments come
//! from the same obstacle polygon: a convex obstacle's boundary can only
//! close back on itself above and below a point that's inside it, never a
//! mix of two different obstacles or the bounding frame.

use crate::{
    arena::TrapezoidId,
    error::PlannerError,
    geometry::{Polygon, extract_edges},
    map::{TrapezoidalMap, build_trapezoidal_map},
};

/// Builds the trapezoidal map for `polygons`' boundary edges and marks every
/// trapezoid whose top and bottom both belong to the same obstacle as
/// `filtered`. The map itself still contains those trapezoids — `filtered`
/// is a flag, not a removal — so a point query that lands in an obstacle
/// still resolves to a leaf (`arena.rs::Trapezoid::filtered`).
pub fn compute_free_space(polygons: &[Polygon]) -> Result<TrapezoidalMap, PlannerError> {
    let segments = extract_edges(polygons);
    let mut map = build_trapezoidal_map(&segments)?;
    mark_filtered(&mut map);
    Ok(map)
}

fn mark_filtered(map: &mut TrapezoidalMap) {
    let ids: Vec<TrapezoidId> = map.trapezoids().map(|(id, _)| id).collect();
    for id in ids {
        let t = map.trapezoid(id);
        let top_obstacle = map.segment(t.top).obstacle_id;
        let bottom_obstacle = map.segment(t.bottom).obstacle_id;
        let inside = top_obstacle >= 0 && top_obstacle == bottom_obstacle;
        map.trapezoid_mut(id).filtered = inside;
    }
}
