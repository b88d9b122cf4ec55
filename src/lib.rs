//! A randomized incremental trapezoidal-map planner: decompose a set of
//! polygonal obstacles into trapezoids, filter out the ones inside an
//! obstacle, build a roadmap over what's left, and answer point-to-point
//! path queries against it.
//!
//! The pipeline, in the order its modules run:
//! 1. [`geometry`] — points, segments, polygons, and the crate's one
//!    tolerance constant.
//! 2. [`arena`] — typed-index storage for trapezoids and search-DAG nodes.
//! 3. [`map`] builds a [`map::TrapezoidalMap`] by inserting segments one at
//!    a time, each insertion going through [`query::locate`] (find where an
//!    endpoint lands), `traversal::follow` (find every trapezoid the new
//!    segment crosses), and an internal `update` step (cut those trapezoids
//!    and rewire the DAG around the result).
//! 4. [`free_space`] marks which trapezoids of a built map fall inside an
//!    obstacle.
//! 5. [`roadmap`] turns the free trapezoids into a graph.
//! 6. [`path`] answers a start/goal query against that graph.
//!
//! [`validate`] holds self-check invariants run in debug builds after every
//! insertion; [`minkowski`] is an independent utility for growing an
//! obstacle by a robot's shape before handing it to [`free_space`].

pub mod arena;
pub mod error;
pub mod free_space;
pub mod geometry;
pub mod map;
pub mod minkowski;
pub mod path;
pub mod query;
pub mod roadmap;
mod traversal;
mod update;
pub mod validate;

pub use error::PlannerError;
pub use geometry::{EPSILON, Point, Polygon, Segment};
pub use map::{TrapezoidalMap, build_trapezoidal_map, build_trapezoidal_map_seeded};
pub use path::{ForbiddenEnd, PathOutcome, compute_path};
pub use roadmap::{RoadMap, build_road_map};
