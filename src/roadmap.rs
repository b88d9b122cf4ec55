//! Turning a filtered trapezoidal map into a graph a path query can search:
//! one node per free trapezoid plus a node at every vertex where more than
//! one trapezoid meets, so a path can route precisely around an obstacle
//! corner instead of cutting across it.
//!
//! Grounded in `original_source/src/compute_path.cpp::buildRoadMap`. The
//! source deduplicates wall-vertex nodes with an exact-key `map<tuple<double,
//! double, double>>`; `SPEC_FULL.md` §4.G calls for epsilon-tolerant dedup
//! instead, implemented here by quantizing coordinates into integer buckets
//! of width `EPSILON` before hashing.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::{
    arena::TrapezoidId,
    geometry::{EPSILON, Point},
    map::TrapezoidalMap,
};

/// A node of the roadmap graph: either a free trapezoid's center, or a
/// vertex shared by several trapezoids.
#[derive(Debug, Clone, Copy)]
pub enum RoadmapNode {
    Center { trapezoid: TrapezoidId, point: Point },
    Wall { point: Point },
}

impl RoadmapNode {
    pub fn point(&self) -> Point {
        match self {
            RoadmapNode::Center { point, .. } => *point,
            RoadmapNode::Wall { point } => *point,
        }
    }
}

/// The free-space connectivity graph built over a [`TrapezoidalMap`].
#[derive(Debug)]
pub struct RoadMap {
    pub(crate) graph: UnGraph<RoadmapNode, ()>,
    pub(crate) center_of: HashMap<TrapezoidId, NodeIndex>,
}

impl RoadMap {
    pub fn graph(&self) -> &UnGraph<RoadmapNode, ()> {
        &self.graph
    }

    pub fn center_node(&self, trapezoid: TrapezoidId) -> Option<NodeIndex> {
        self.center_of.get(&trapezoid).copied()
    }
}

/// Quantizes `(w, y_lo, y_hi)` into integer buckets of width `EPSILON`, per
/// `SPEC_FULL.md` §4.G's "(w, y-low, y-high)" dedup key.
fn quantize3(w: f64, y_lo: f64, y_hi: f64) -> (i64, i64, i64) {
    let bucket = |v: f64| (v / EPSILON).round() as i64;
    (bucket(w), bucket(y_lo), bucket(y_hi))
}

/// The overlapping y-interval at `x = w` between a trapezoid and one of its
/// neighbors on that wall, per `SPEC_FULL.md` §4.G: `[max(bottoms), min(tops)]`.
/// `None` if the interval is empty (or a single point) under `EPSILON`.
fn overlap_interval(
    map: &TrapezoidalMap,
    t: &crate::arena::Trapezoid,
    neighbor: &crate::arena::Trapezoid,
    w: f64,
) -> Option<(f64, f64)> {
    let lo = f64::max(map.segment(t.bottom).y_at(w), map.segment(neighbor.bottom).y_at(w));
    let hi = f64::min(map.segment(t.top).y_at(w), map.segment(neighbor.top).y_at(w));
    (hi - lo > EPSILON).then_some((lo, hi))
}

/// Builds the roadmap for the free trapezoids of `map` (every trapezoid with
/// `filtered == false`).
///
/// Two passes, matching `SPEC_FULL.md` §4.G:
/// 1. one [`RoadmapNode::Center`] per free trapezoid;
/// 2. for each free trapezoid's right wall, one [`RoadmapNode::Wall`] node
///    per distinct free neighbor on that side, placed at the midpoint of the
///    y-interval the two trapezoids actually share there (not at the wall's
///    bounding vertex, which may not lie inside the overlap at all once the
///    neighbor's own top/bottom is taken into account). The left wall of
///    every trapezoid is covered by its left neighbor's right-side pass, so
///    only the right side needs to be walked.
pub fn build_road_map(map: &TrapezoidalMap) -> RoadMap {
    let mut graph: UnGraph<RoadmapNode, ()> = UnGraph::new_undirected();
    let mut center_of: HashMap<TrapezoidId, NodeIndex> = HashMap::new();

    for (id, t) in map.trapezoids() {
        if t.filtered {
            continue;
        }
        let point = map.trapezoid_center(id);
        let idx = graph.add_node(RoadmapNode::Center { trapezoid: id, point });
        center_of.insert(id, idx);
    }

    let mut wall_of: HashMap<(i64, i64, i64), NodeIndex> = HashMap::new();

    for (id, t) in map.trapezoids() {
        if t.filtered {
            continue;
        }
        let Some(&self_idx) = center_of.get(&id) else { continue };
        let w = t.rightp.x;

        let mut neighbors = [t.upper_right, t.lower_right];
        if neighbors[0] == neighbors[1] {
            neighbors[1] = None;
        }
        for neighbor_id in neighbors.into_iter().flatten() {
            let Some(&neighbor_idx) = center_of.get(&neighbor_id) else { continue };
            let neighbor = map.trapezoid(neighbor_id);
            let Some((y_lo, y_hi)) = overlap_interval(map, t, neighbor, w) else { continue };

            let key = quantize3(w, y_lo, y_hi);
            let wall_idx = *wall_of
                .entry(key)
                .or_insert_with(|| graph.add_node(RoadmapNode::Wall { point: Point::new(w, (y_lo + y_hi) / 2.0) }));
            graph.update_edge(self_idx, wall_idx, ());
            graph.update_edge(wall_idx, neighbor_idx, ());
        }
    }

    RoadMap { graph, center_of }
}
