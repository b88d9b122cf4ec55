//! The trapezoidal map itself: the three owning arenas, the bounding-frame
//! bootstrap (`SPEC_FULL.md` §4.E step 0), and the two build entry points.

use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

use crate::{
    arena::{Arena, DagNode, NodeId, SegmentId, Trapezoid, TrapezoidId},
    error::PlannerError,
    geometry::{Point, Segment},
    traversal::follow,
    update,
};

/// Owns every trapezoid, DAG node, and segment created while building a
/// decomposition. There is exactly one of these per planning session; it is
/// plain owned data with no interior mutability (`SPEC_FULL.md` §5).
#[derive(Debug)]
pub struct TrapezoidalMap {
    pub(crate) trapezoids: Arena<Trapezoid>,
    pub(crate) nodes: Arena<DagNode>,
    pub(crate) segments: Arena<Segment>,
    pub(crate) root: NodeId,
}

impl TrapezoidalMap {
    /// Builds the bounding frame and initial trapezoid (step 0 of §4.E).
    /// `segments` is only consulted for its extent; none of them are
    /// inserted yet.
    fn bootstrap(segments: &[Segment]) -> Self {
        let (min_x, max_x, min_y, max_y) = bounding_extent(segments);
        let margin = (f64::max(max_x - min_x, max_y - min_y) * 0.1).max(1.0);
        let (min_x, max_x) = (min_x - margin, max_x + margin);
        let (min_y, max_y) = (min_y - margin, max_y + margin);

        let mut segment_arena = Arena::new();
        let top_bound =
            segment_arena.insert(Segment::with_obstacle(Point::new(min_x, max_y), Point::new(max_x, max_y), -1));
        let bottom_bound =
            segment_arena.insert(Segment::with_obstacle(Point::new(min_x, min_y), Point::new(max_x, min_y), -1));

        let mut trapezoid_arena: Arena<Trapezoid> = Arena::new();
        let mut node_arena: Arena<DagNode> = Arena::new();

        // The initial trapezoid and its leaf are mutually referential: the
        // trapezoid is inserted with a placeholder node id, the leaf is
        // created pointing at it, then the trapezoid's `node` field is
        // patched to point back. Every trapezoid/leaf pair created during
        // incremental updates follows this same insert-then-patch shape.
        let initial_id = trapezoid_arena.insert(Trapezoid::new(
            top_bound,
            bottom_bound,
            Point::new(min_x, (min_y + max_y) / 2.0),
            Point::new(max_x, (min_y + max_y) / 2.0),
            NodeId::first(),
        ));
        let placeholder_node = node_arena.insert(DagNode::Leaf { trapezoid: initial_id });
        trapezoid_arena.get_mut(initial_id).node = placeholder_node;

        TrapezoidalMap {
            trapezoids: trapezoid_arena,
            nodes: node_arena,
            segments: segment_arena,
            root: placeholder_node,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &DagNode {
        self.nodes.get(id)
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut DagNode {
        self.nodes.get_mut(id)
    }

    pub fn trapezoid(&self, id: TrapezoidId) -> &Trapezoid {
        self.trapezoids.get(id)
    }

    pub(crate) fn trapezoid_mut(&mut self, id: TrapezoidId) -> &mut Trapezoid {
        self.trapezoids.get_mut(id)
    }

    /// A point guaranteed to lie in the interior of trapezoid `id`: the
    /// midpoint of its left and right edges, clipped to its top/bottom bound
    /// at that x. Used both by the free-space filter (as the point tested
    /// against each obstacle polygon) and by the roadmap builder (as the
    /// trapezoid's roadmap node position).
    pub fn trapezoid_center(&self, id: TrapezoidId) -> Point {
        let t = self.trapezoid(id);
        let mid_x = (t.leftp.x + t.rightp.x) / 2.0;
        let top_y = self.segment(t.top).y_at(mid_x);
        let bottom_y = self.segment(t.bottom).y_at(mid_x);
        Point::new(mid_x, (top_y + bottom_y) / 2.0)
    }

    pub fn segment(&self, id: SegmentId) -> &Segment {
        self.segments.get(id)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Iterates the live trapezoid set, i.e. every trapezoid still reachable
    /// through the arena, *including* ones the free-space filter has marked
    /// `filtered` (use `.filter(|(_, t)| !t.filtered)` for free space only).
    pub fn trapezoids(&self) -> impl Iterator<Item = (TrapezoidId, &Trapezoid)> {
        self.trapezoids.iter()
    }

    /// Iterates every search-DAG node ever created, live or dead. Used by
    /// `validate.rs` to scan for leaves that reference the same trapezoid
    /// (a violation of I1's "reachable from exactly one leaf").
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &DagNode)> {
        self.nodes.iter()
    }

    fn insert_segment(&mut self, seg: Segment) -> Result<(), PlannerError> {
        let seg_id = self.segments.insert(seg);
        let intersected = follow(self, self.segments.get(seg_id))?;
        if intersected.len() == 1 {
            update::insert_in_single_trapezoid(self, intersected[0], seg_id);
        } else {
            update::insert_across_multiple_trapezoids(self, &intersected, seg_id);
        }
        #[cfg(debug_assertions)]
        crate::validate::validate_all(self).expect("invariant violated after insertion");
        Ok(())
    }
}

fn bounding_extent(segments: &[Segment]) -> (f64, f64, f64, f64) {
    if segments.is_empty() {
        return (0.0, 100.0, 0.0, 100.0);
    }
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for s in segments {
        for p in [s.p1, s.p2] {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
    }
    (min_x, max_x, min_y, max_y)
}

fn build_with_order(segments: &[Segment], mut order: Vec<Segment>) -> Result<TrapezoidalMap, PlannerError> {
    let mut map = TrapezoidalMap::bootstrap(segments);
    for seg in order.drain(..) {
        map.insert_segment(seg)?;
    }
    Ok(map)
}

/// Builds a trapezoidal map from `segments`, randomizing insertion order with
/// an OS-seeded RNG to get the textbook algorithm's expected O(n log n)
/// construction and expected O(log n) query depth (`SPEC_FULL.md` §5). The
/// source left this randomization commented out; this crate enables it.
pub fn build_trapezoidal_map(segments: &[Segment]) -> Result<TrapezoidalMap, PlannerError> {
    let mut order = segments.to_vec();
    order.shuffle(&mut rand::rng());
    build_with_order(segments, order)
}

/// As [`build_trapezoidal_map`], but with an explicit seed for the insertion
/// permutation, so tests can reproduce a specific decomposition.
pub fn build_trapezoidal_map_seeded(segments: &[Segment], seed: u64) -> Result<TrapezoidalMap, PlannerError> {
    let mut order = segments.to_vec();
    order.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    build_with_order(segments, order)
}
