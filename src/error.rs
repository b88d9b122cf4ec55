use thiserror::Error;

use crate::{arena::TrapezoidId, geometry::Segment};

/// Structural failures of the trapezoidal map itself.
///
/// These never arise from a well-formed, general-position input; they
/// indicate a broken invariant in the incremental updater and are surfaced to
/// the caller rather than panicking, so tests can assert on them directly.
#[derive(Error, Debug, Clone)]
pub enum PlannerError {
    #[error(
        "segment-trapezoid traversal exceeded its safety bound ({limit} steps) while inserting {segment:?}"
    )]
    TraversalOverflow { segment: Segment, limit: usize },

    #[error("broken neighbor graph: trapezoid {0:?} has a null neighbor where traversal required one")]
    NullNeighbor(TrapezoidId),

    #[error("circular neighbor link detected at trapezoid {0:?}")]
    CircularNeighbor(TrapezoidId),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
