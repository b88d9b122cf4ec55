//! Resolving a start/goal pair into a path over the roadmap.
//!
//! Grounded in `original_source/src/compute_path.cpp::breadthFirstSearch` and
//! `COMPUTEPATH`: locate both endpoints, reject either one that falls in an
//! obstacle, breadth-first search the roadmap graph between their trapezoid
//! centers, and stitch the endpoints onto the resulting polyline.

use petgraph::{graph::NodeIndex, visit::EdgeRef};
use std::collections::VecDeque;
use std::fmt;

use crate::{geometry::Point, map::TrapezoidalMap, query::locate, roadmap::RoadMap};

/// Which endpoint of a path query turned out to be unreachable because it
/// sits inside an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenEnd {
    Start,
    Goal,
}

impl fmt::Display for ForbiddenEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForbiddenEnd::Start => write!(f, "start in forbidden space"),
            ForbiddenEnd::Goal => write!(f, "goal in forbidden space"),
        }
    }
}

/// The result of a path query. Never an `Err`: failing to find a path is a
/// normal, expected outcome for a well-formed query, not a structural
/// failure of the planner (`SPEC_FULL.md` §7).
///
/// `Forbidden`'s `Display` impl renders the human-readable reason the spec's
/// scenario 5 names literally ("start in forbidden space"); callers that want
/// the structured endpoint can still match on `ForbiddenEnd` directly.
#[derive(Debug, Clone)]
pub enum PathOutcome {
    Found(Vec<Point>),
    Forbidden(ForbiddenEnd),
    NoPath,
}

impl fmt::Display for PathOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathOutcome::Found(points) => write!(f, "found a path with {} points", points.len()),
            PathOutcome::Forbidden(end) => write!(f, "{end}"),
            PathOutcome::NoPath => write!(f, "no path exists between start and goal"),
        }
    }
}

/// Finds a path from `start` to `goal` through the free space of `map`,
/// using the connectivity precomputed in `roadmap`.
pub fn compute_path(map: &TrapezoidalMap, roadmap: &RoadMap, start: Point, goal: Point) -> PathOutcome {
    let start_trap = locate(map, map.root(), start);
    if map.trapezoid(start_trap).filtered {
        return PathOutcome::Forbidden(ForbiddenEnd::Start);
    }
    let goal_trap = locate(map, map.root(), goal);
    if map.trapezoid(goal_trap).filtered {
        return PathOutcome::Forbidden(ForbiddenEnd::Goal);
    }

    let (Some(start_idx), Some(goal_idx)) = (roadmap.center_node(start_trap), roadmap.center_node(goal_trap)) else {
        return PathOutcome::NoPath;
    };

    let Some(node_path) = breadth_first_search(roadmap, start_idx, goal_idx) else {
        return PathOutcome::NoPath;
    };

    let mut points = Vec::with_capacity(node_path.len() + 2);
    points.push(start);
    for idx in node_path {
        let p = roadmap.graph()[idx].point();
        if points.last().is_none_or(|last: &Point| !last.approx_eq(p)) {
            points.push(p);
        }
    }
    if points.last().is_none_or(|last: &Point| !last.approx_eq(goal)) {
        points.push(goal);
    }

    PathOutcome::Found(points)
}

/// Plain BFS with a predecessor map, returning the node sequence from `start`
/// to `goal` (inclusive), or `None` if they're in different components.
fn breadth_first_search(roadmap: &RoadMap, start: NodeIndex, goal: NodeIndex) -> Option<Vec<NodeIndex>> {
    if start == goal {
        return Some(vec![start]);
    }

    let graph = roadmap.graph();
    let mut visited = vec![false; graph.node_count()];
    let mut predecessor = vec![None; graph.node_count()];
    let mut queue = VecDeque::new();

    visited[start.index()] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for edge in graph.edges(current) {
            let next = edge.target();
            if visited[next.index()] {
                continue;
            }
            visited[next.index()] = true;
            predecessor[next.index()] = Some(current);
            if next == goal {
                queue.clear();
                break;
            }
            queue.push_back(next);
        }
    }

    if !visited[goal.index()] {
        return None;
    }

    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = predecessor[current.index()]?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use crate::{free_space::compute_free_space, geometry::Polygon, roadmap::build_road_map};

    use super::*;

    #[test]
    fn a_path_through_open_space_is_found() {
        let map = compute_free_space(&[]).unwrap();
        let roadmap = build_road_map(&map);
        let outcome = compute_path(&map, &roadmap, Point::new(-5.0, 0.0), Point::new(5.0, 0.0));
        assert!(matches!(outcome, PathOutcome::Found(_)));
    }

    #[test]
    fn a_start_point_inside_an_obstacle_is_forbidden() {
        let triangle =
            Polygon::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 10.0)]);
        let map = compute_free_space(&[triangle]).unwrap();
        let roadmap = build_road_map(&map);
        let outcome = compute_path(&map, &roadmap, Point::new(5.0, 3.0), Point::new(20.0, 20.0));
        assert!(matches!(outcome, PathOutcome::Forbidden(ForbiddenEnd::Start)));
        assert_eq!(outcome.to_string(), "start in forbidden space");
    }

    #[test]
    fn a_goal_point_inside_an_obstacle_reports_the_goal_by_name() {
        let triangle =
            Polygon::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 10.0)]);
        let map = compute_free_space(&[triangle]).unwrap();
        let roadmap = build_road_map(&map);
        let outcome = compute_path(&map, &roadmap, Point::new(20.0, 20.0), Point::new(5.0, 3.0));
        assert!(matches!(outcome, PathOutcome::Forbidden(ForbiddenEnd::Goal)));
        assert_eq!(outcome.to_string(), "goal in forbidden space");
    }

    #[test]
    fn found_path_starts_and_ends_at_the_requested_points() {
        let triangle =
            Polygon::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 10.0)]);
        let map = compute_free_space(&[triangle]).unwrap();
        let roadmap = build_road_map(&map);
        let start = Point::new(-20.0, -20.0);
        let goal = Point::new(20.0, -20.0);
        if let PathOutcome::Found(points) = compute_path(&map, &roadmap, start, goal) {
            assert!(points.first().unwrap().approx_eq(start));
            assert!(points.last().unwrap().approx_eq(goal));
        }
    }
}
