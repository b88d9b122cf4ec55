//! Incremental insertion: cutting a new segment into the trapezoids it
//! passes through and re-wiring the search DAG around the result.
//!
//! Grounded in `original_source/src/trapezoidal_map.cpp::insertInSingleTrapezoid`
//! and `::insertAcrossMultipleTrapezoids`, with two deliberate departures
//! recorded in `DESIGN.md`: the neighbor-inheritance fix for the case where a
//! segment endpoint coincides with an existing trapezoid vertex (the
//! "a-absent" case), and an upper/lower run-merge pass the source left
//! undone.

use crate::arena::{DagNode, NodeId, SegmentId, Trapezoid, TrapezoidId};
use crate::geometry::Point;
use crate::map::TrapezoidalMap;

/// Allocates a trapezoid together with the DAG leaf that points at it,
/// wiring the two together. Every trapezoid created during an insertion goes
/// through here; the `node` field passed to `Trapezoid::new` is a throwaway
/// placeholder immediately overwritten once the real leaf exists.
fn new_trapezoid(map: &mut TrapezoidalMap, top: SegmentId, bottom: SegmentId, leftp: Point, rightp: Point) -> TrapezoidId {
    let id = map.trapezoids.insert(Trapezoid::new(top, bottom, leftp, rightp, NodeId::first()));
    let node = map.nodes.insert(DagNode::Leaf { trapezoid: id });
    map.trapezoids.get_mut(id).node = node;
    id
}

/// Replaces `old` with `new` in whichever of `neighbor`'s *upper* slots
/// (`upper_left`/`upper_right`) currently hold it, leaving its lower slots
/// untouched. Used to fix up the reciprocal side of a neighbor relationship
/// after a trapezoid on the other end of it has been replaced.
fn repoint_upper(map: &mut TrapezoidalMap, neighbor: Option<TrapezoidId>, old: TrapezoidId, new: TrapezoidId) {
    let Some(n) = neighbor else { return };
    let t = map.trapezoids.get_mut(n);
    if t.upper_left == Some(old) {
        t.upper_left = Some(new);
    }
    if t.upper_right == Some(old) {
        t.upper_right = Some(new);
    }
}

/// As [`repoint_upper`], but for the `lower_left`/`lower_right` slots.
///
/// Keeping this split from `repoint_upper` instead of one function that
/// touches all four slots is what fixes the source's "a-absent" bug: when a
/// segment endpoint lands exactly on an existing vertex and a single old
/// neighbor bordered both the soon-to-be-upper and soon-to-be-lower pieces,
/// calling `repoint_upper(.., b)` then `repoint_lower(.., c)` against the
/// *same* neighbor un-mirrors its two slots independently instead of
/// collapsing them onto one replacement.
fn repoint_lower(map: &mut TrapezoidalMap, neighbor: Option<TrapezoidId>, old: TrapezoidId, new: TrapezoidId) {
    let Some(n) = neighbor else { return };
    let t = map.trapezoids.get_mut(n);
    if t.lower_left == Some(old) {
        t.lower_left = Some(new);
    }
    if t.lower_right == Some(old) {
        t.lower_right = Some(new);
    }
}

/// Case k = 1: the new segment lies entirely inside a single trapezoid.
///
/// Splits `tau` into up to four pieces: `a` (left of the segment, only if
/// the segment's left endpoint isn't already `tau.leftp`), `b` (above the
/// segment), `c` (below it), and `d` (right of the segment, only if its
/// right endpoint isn't already `tau.rightp`).
pub fn insert_in_single_trapezoid(map: &mut TrapezoidalMap, tau_id: TrapezoidId, seg_id: SegmentId) {
    let tau = map.trapezoids.get(tau_id).clone();
    let seg = *map.segment(seg_id);
    let p = seg.left();
    let q = seg.right();
    let has_left = !p.approx_eq(tau.leftp);
    let has_right = !q.approx_eq(tau.rightp);

    let b_id = new_trapezoid(map, tau.top, seg_id, p, q);
    let c_id = new_trapezoid(map, seg_id, tau.bottom, p, q);
    let a_id = has_left.then(|| new_trapezoid(map, tau.top, tau.bottom, tau.leftp, p));
    let d_id = has_right.then(|| new_trapezoid(map, tau.top, tau.bottom, q, tau.rightp));

    if let Some(a) = a_id {
        let t = map.trapezoids.get_mut(a);
        t.upper_left = tau.upper_left;
        t.lower_left = tau.lower_left;
        t.upper_right = Some(b_id);
        t.lower_right = Some(c_id);
    }
    if let Some(d) = d_id {
        let t = map.trapezoids.get_mut(d);
        t.upper_left = Some(b_id);
        t.lower_left = Some(c_id);
        t.upper_right = tau.upper_right;
        t.lower_right = tau.lower_right;
    }

    let b_left = if has_left { a_id } else { tau.upper_left };
    let c_left = if has_left { a_id } else { tau.lower_left };
    let b_right = if has_right { d_id } else { tau.upper_right };
    let c_right = if has_right { d_id } else { tau.lower_right };
    {
        let t = map.trapezoids.get_mut(b_id);
        t.upper_left = b_left;
        t.lower_left = b_left;
        t.upper_right = b_right;
        t.lower_right = b_right;
    }
    {
        let t = map.trapezoids.get_mut(c_id);
        t.upper_left = c_left;
        t.lower_left = c_left;
        t.upper_right = c_right;
        t.lower_right = c_right;
    }

    if has_left {
        repoint_upper(map, tau.upper_left, tau_id, a_id.unwrap());
        repoint_lower(map, tau.lower_left, tau_id, a_id.unwrap());
    } else {
        repoint_upper(map, tau.upper_left, tau_id, b_id);
        repoint_lower(map, tau.lower_left, tau_id, c_id);
    }
    if has_right {
        repoint_upper(map, tau.upper_right, tau_id, d_id.unwrap());
        repoint_lower(map, tau.lower_right, tau_id, d_id.unwrap());
    } else {
        repoint_upper(map, tau.upper_right, tau_id, b_id);
        repoint_lower(map, tau.lower_right, tau_id, c_id);
    }

    let b_node = map.trapezoid(b_id).node;
    let c_node = map.trapezoid(c_id).node;
    let new_root = match (a_id, d_id) {
        (Some(a), Some(d)) => {
            let a_node = map.trapezoid(a).node;
            let d_node = map.trapezoid(d).node;
            let y_node = map.nodes.insert(DagNode::Y { segment: seg_id, above: b_node, below: c_node });
            let right_of_p = map.nodes.insert(DagNode::X { point: q, left: y_node, right: d_node });
            DagNode::X { point: p, left: a_node, right: right_of_p }
        }
        (Some(a), None) => {
            let a_node = map.trapezoid(a).node;
            let y_node = map.nodes.insert(DagNode::Y { segment: seg_id, above: b_node, below: c_node });
            DagNode::X { point: p, left: a_node, right: y_node }
        }
        (None, Some(d)) => {
            let d_node = map.trapezoid(d).node;
            let y_node = map.nodes.insert(DagNode::Y { segment: seg_id, above: b_node, below: c_node });
            DagNode::X { point: q, left: y_node, right: d_node }
        }
        (None, None) => DagNode::Y { segment: seg_id, above: b_node, below: c_node },
    };
    *map.nodes.get_mut(tau.node) = new_root;
    map.trapezoids.remove(tau_id);
}

/// Builds the merged run of upper (or lower) pieces across `old`, one
/// trapezoid per maximal run of consecutive old trapezoids sharing the same
/// bounding segment on that side, and links adjacent runs to each other.
/// Returns the run trapezoid id for each original index in `old`.
fn build_runs(
    map: &mut TrapezoidalMap,
    old: &[Trapezoid],
    p: Point,
    q: Point,
    seg_id: SegmentId,
    upper: bool,
) -> Vec<TrapezoidId> {
    let k = old.len();
    let mut per_tau: Vec<Option<TrapezoidId>> = vec![None; k];
    let mut prev: Option<TrapezoidId> = None;
    let mut i = 0;
    while i < k {
        let left_bound = if i == 0 { p } else { old[i].leftp };
        let bound_id = if upper { old[i].top } else { old[i].bottom };
        let mut j = i;
        while j + 1 < k {
            let next_bound = if upper { old[j + 1].top } else { old[j + 1].bottom };
            if next_bound != bound_id {
                break;
            }
            j += 1;
        }
        let right_bound = if j == k - 1 { q } else { old[j].rightp };
        let run_id =
            if upper { new_trapezoid(map, bound_id, seg_id, left_bound, right_bound) } else { new_trapezoid(map, seg_id, bound_id, left_bound, right_bound) };

        if let Some(prev_id) = prev {
            let t = map.trapezoids.get_mut(prev_id);
            t.upper_right = Some(run_id);
            t.lower_right = Some(run_id);
            let t2 = map.trapezoids.get_mut(run_id);
            t2.upper_left = Some(prev_id);
            t2.lower_left = Some(prev_id);
        }
        prev = Some(run_id);

        for slot in &mut per_tau[i..=j] {
            *slot = Some(run_id);
        }
        i = j + 1;
    }
    per_tau.into_iter().map(|o| o.expect("every trapezoid index is covered by exactly one run")).collect()
}

/// Case k >= 2: the new segment crosses several trapezoids.
///
/// `taus` is the left-to-right sequence returned by [`crate::traversal::follow`].
pub fn insert_across_multiple_trapezoids(map: &mut TrapezoidalMap, taus: &[TrapezoidId], seg_id: SegmentId) {
    let k = taus.len();
    debug_assert!(k >= 2, "single-trapezoid insertions go through insert_in_single_trapezoid");

    let old: Vec<Trapezoid> = taus.iter().map(|&id| map.trapezoids.get(id).clone()).collect();
    let seg = *map.segment(seg_id);
    let p = seg.left();
    let q = seg.right();
    let has_left = !p.approx_eq(old[0].leftp);
    let has_right = !q.approx_eq(old[k - 1].rightp);

    let a0_id = has_left.then(|| new_trapezoid(map, old[0].top, old[0].bottom, old[0].leftp, p));
    let d_last_id = has_right.then(|| new_trapezoid(map, old[k - 1].top, old[k - 1].bottom, q, old[k - 1].rightp));

    let upper_for_tau = build_runs(map, &old, p, q, seg_id, true);
    let lower_for_tau = build_runs(map, &old, p, q, seg_id, false);

    if let Some(a0) = a0_id {
        let t = map.trapezoids.get_mut(a0);
        t.upper_left = old[0].upper_left;
        t.lower_left = old[0].lower_left;
        t.upper_right = Some(upper_for_tau[0]);
        t.lower_right = Some(lower_for_tau[0]);
    }
    if let Some(d_last) = d_last_id {
        let t = map.trapezoids.get_mut(d_last);
        t.upper_left = Some(upper_for_tau[k - 1]);
        t.lower_left = Some(lower_for_tau[k - 1]);
        t.upper_right = old[k - 1].upper_right;
        t.lower_right = old[k - 1].lower_right;
    }

    let first_upper_left = if has_left { a0_id } else { old[0].upper_left };
    let first_lower_left = if has_left { a0_id } else { old[0].lower_left };
    {
        let t = map.trapezoids.get_mut(upper_for_tau[0]);
        t.upper_left = first_upper_left;
        t.lower_left = first_upper_left;
    }
    {
        let t = map.trapezoids.get_mut(lower_for_tau[0]);
        t.upper_left = first_lower_left;
        t.lower_left = first_lower_left;
    }
    let last_upper_right = if has_right { d_last_id } else { old[k - 1].upper_right };
    let last_lower_right = if has_right { d_last_id } else { old[k - 1].lower_right };
    {
        let t = map.trapezoids.get_mut(upper_for_tau[k - 1]);
        t.upper_right = last_upper_right;
        t.lower_right = last_upper_right;
    }
    {
        let t = map.trapezoids.get_mut(lower_for_tau[k - 1]);
        t.upper_right = last_lower_right;
        t.lower_right = last_lower_right;
    }

    if has_left {
        repoint_upper(map, old[0].upper_left, taus[0], a0_id.unwrap());
        repoint_lower(map, old[0].lower_left, taus[0], a0_id.unwrap());
    } else {
        repoint_upper(map, old[0].upper_left, taus[0], upper_for_tau[0]);
        repoint_lower(map, old[0].lower_left, taus[0], lower_for_tau[0]);
    }
    if has_right {
        repoint_upper(map, old[k - 1].upper_right, taus[k - 1], d_last_id.unwrap());
        repoint_lower(map, old[k - 1].lower_right, taus[k - 1], d_last_id.unwrap());
    } else {
        repoint_upper(map, old[k - 1].upper_right, taus[k - 1], upper_for_tau[k - 1]);
        repoint_lower(map, old[k - 1].lower_right, taus[k - 1], lower_for_tau[k - 1]);
    }

    let a0_node = a0_id.map(|id| map.trapezoid(id).node);
    let d_last_node = d_last_id.map(|id| map.trapezoid(id).node);

    for i in 0..k {
        let upper_node = map.trapezoid(upper_for_tau[i]).node;
        let lower_node = map.trapezoid(lower_for_tau[i]).node;
        let y = DagNode::Y { segment: seg_id, above: upper_node, below: lower_node };

        let content = if i == 0 && has_left {
            let y_node = map.nodes.insert(y);
            DagNode::X { point: p, left: a0_node.unwrap(), right: y_node }
        } else if i == k - 1 && has_right {
            let y_node = map.nodes.insert(y);
            DagNode::X { point: q, left: y_node, right: d_last_node.unwrap() }
        } else {
            y
        };
        *map.nodes.get_mut(old[i].node) = content;
        map.trapezoids.remove(taus[i]);
    }
}

#[cfg(test)]
mod tests {
    use assertables::{assert_gt, assert_le, assert_lt};

    use crate::geometry::{Point, Segment};

    use super::*;

    #[test]
    fn single_trapezoid_insertion_with_both_endpoints_flush_produces_only_b_and_c() {
        let mut map = crate::map::build_trapezoidal_map_seeded(&[], 0).unwrap();
        let (tau_id, tau) = map.trapezoids().next().map(|(id, t)| (id, t.clone())).unwrap();

        let seg = Segment::new(tau.leftp, tau.rightp);
        let seg_id = map.segments.insert(seg);
        insert_in_single_trapezoid(&mut map, tau_id, seg_id);

        assert_eq!(map.trapezoids().count(), 2);
        match map.node(map.root()) {
            DagNode::Y { segment, .. } => assert_eq!(*segment, seg_id),
            other => panic!("expected a bare Y-node when both a and d are absent, got {other:?}"),
        }
    }

    #[test]
    fn single_trapezoid_insertion_with_left_endpoint_flush_omits_a() {
        let mut map = crate::map::build_trapezoidal_map_seeded(&[], 0).unwrap();
        let (tau_id, tau) = map.trapezoids().next().map(|(id, t)| (id, t.clone())).unwrap();

        let right = Point::new(tau.leftp.x + (tau.rightp.x - tau.leftp.x) * 0.5, tau.leftp.y - 1.0);
        let seg = Segment::new(tau.leftp, right);
        let seg_id = map.segments.insert(seg);
        insert_in_single_trapezoid(&mut map, tau_id, seg_id);

        // b, c, d: a is omitted because the segment's left endpoint already
        // sits on tau's left wall.
        assert_eq!(map.trapezoids().count(), 3);
        match map.node(map.root()) {
            DagNode::X { point, .. } => assert!(point.approx_eq(right)),
            other => panic!("expected X-node(q) when only d exists, got {other:?}"),
        }
    }

    #[test]
    fn single_trapezoid_insertion_with_right_endpoint_flush_omits_d() {
        let mut map = crate::map::build_trapezoidal_map_seeded(&[], 0).unwrap();
        let (tau_id, tau) = map.trapezoids().next().map(|(id, t)| (id, t.clone())).unwrap();

        let left = Point::new(tau.leftp.x + (tau.rightp.x - tau.leftp.x) * 0.5, tau.rightp.y - 1.0);
        let seg = Segment::new(left, tau.rightp);
        let seg_id = map.segments.insert(seg);
        insert_in_single_trapezoid(&mut map, tau_id, seg_id);

        assert_eq!(map.trapezoids().count(), 3);
        match map.node(map.root()) {
            DagNode::X { point, .. } => assert!(point.approx_eq(left)),
            other => panic!("expected X-node(p) when only a exists, got {other:?}"),
        }
    }

    #[test]
    fn single_trapezoid_insertion_with_neither_endpoint_flush_produces_all_four_pieces() {
        let mut map = crate::map::build_trapezoidal_map_seeded(&[], 0).unwrap();
        let (tau_id, tau) = map.trapezoids().next().map(|(id, t)| (id, t.clone())).unwrap();

        let span = tau.rightp.x - tau.leftp.x;
        let left = Point::new(tau.leftp.x + span * 0.25, tau.leftp.y - 1.0);
        let right = Point::new(tau.leftp.x + span * 0.75, tau.leftp.y - 1.0);
        let seg = Segment::new(left, right);
        let seg_id = map.segments.insert(seg);
        insert_in_single_trapezoid(&mut map, tau_id, seg_id);

        assert_eq!(map.trapezoids().count(), 4);
        match map.node(map.root()) {
            DagNode::X { point, .. } => assert!(point.approx_eq(left)),
            other => panic!("expected X-node(p) as the outermost split, got {other:?}"),
        }
    }

    /// Directly exercises the upper/lower run-merge pass described in
    /// `SPEC_FULL.md` §4.E and §9: consecutive old trapezoids that bound the
    /// same `top` segment must collapse into a single new trapezoid (and
    /// therefore a single shared DAG leaf), while a change of bounding
    /// segment must start a new run.
    #[test]
    fn build_runs_merges_consecutive_trapezoids_sharing_the_same_bound_segment() {
        let mut map = crate::map::build_trapezoidal_map_seeded(&[], 0).unwrap();
        let bottom = map.segments.insert(Segment::new(Point::new(0.0, 0.0), Point::new(300.0, 0.0)));
        let top_a = map.segments.insert(Segment::new(Point::new(0.0, 50.0), Point::new(150.0, 55.0)));
        let top_b = map.segments.insert(Segment::new(Point::new(150.0, 60.0), Point::new(300.0, 65.0)));
        let inserted = map.segments.insert(Segment::new(Point::new(0.0, 10.0), Point::new(300.0, 10.0)));

        let dummy_node = NodeId::first();
        let old = vec![
            Trapezoid::new(top_a, bottom, Point::new(0.0, 0.0), Point::new(100.0, 0.0), dummy_node),
            Trapezoid::new(top_a, bottom, Point::new(100.0, 0.0), Point::new(150.0, 0.0), dummy_node),
            Trapezoid::new(top_b, bottom, Point::new(150.0, 0.0), Point::new(300.0, 0.0), dummy_node),
        ];

        let runs = build_runs(&mut map, &old, Point::new(0.0, 999.0), Point::new(300.0, 999.0), inserted, true);

        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0], runs[1], "both share top_a, so they must merge into one trapezoid");
        assert_ne!(runs[1], runs[2], "top changes from top_a to top_b, so a new run must start");
        // Merging means fewer trapezoids than the naive one-per-input count.
        let distinct: std::collections::HashSet<_> = runs.iter().collect();
        assert_lt!(distinct.len(), old.len());
    }

    #[test]
    fn new_trapezoid_wires_the_leaf_and_trapezoid_back_references_together() {
        let mut map = crate::map::build_trapezoidal_map_seeded(&[], 0).unwrap();
        let seg_id = map.segments.insert(Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0)));
        let id = new_trapezoid(&mut map, seg_id, seg_id, Point::new(0.0, 0.0), Point::new(1.0, 0.0));

        let node = map.trapezoid(id).node;
        match map.node(node) {
            DagNode::Leaf { trapezoid } => assert_eq!(*trapezoid, id),
            other => panic!("expected a leaf, got {other:?}"),
        }
        assert_gt!(map.trapezoids().count(), 0);
        assert_le!(map.trapezoids().filter(|(tid, _)| *tid == id).count(), 1);
    }
}
