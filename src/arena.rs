//! Typed-index arenas for trapezoids, search-DAG nodes, and segments.
//!
//! The source implementation links these three kinds of record together with
//! raw, mutually cyclic pointers (trapezoid neighbors, trapezoid↔leaf
//! back-references, shared DAG leaves). `SPEC_FULL.md` §9 calls for breaking
//! that cycle by holding everything in typed arenas and replacing every link
//! with an index handle; that's what `Id<T>` and `Arena<T>` are for. The
//! pattern itself is the teacher's `TypedIx<T, Ix>`, generalized away from
//! `petgraph::adj::IndexType` since an arena isn't a graph — a plain `u32`
//! index is enough, and there's no benefit to a pluggable backing integer
//! here the way there is for `petgraph`'s edge/node indices.

use std::{
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use crate::geometry::Point;

/// A typed index into an [`Arena<T>`]. Two `Id`s with different `T` are
/// different Rust types, so a `TrapezoidId` can never be handed to a function
/// expecting a `NodeId`, even though both are just a `u32` underneath.
pub struct Id<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    fn new(index: u32) -> Self {
        Id { index, _marker: PhantomData }
    }

    fn index(self) -> usize {
        self.index as usize
    }

    /// The id an empty arena's first `insert` will hand back. Used to break
    /// the mutual-reference cycle when bootstrapping the initial trapezoid
    /// and its DAG leaf together (see `map.rs::TrapezoidalMap::bootstrap`).
    pub(crate) fn first() -> Self {
        Id::new(0)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id<{}>({})", std::any::type_name::<T>(), self.index)
    }
}

/// An owning store of `T`, addressed by stable [`Id<T>`] handles.
///
/// Removal tombstones the slot (`Option::take`) instead of compacting the
/// vector, so every `Id<T>` ever issued stays either valid or detectably
/// stale — no index is ever silently reused to point at an unrelated value.
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena { slots: Vec::new() }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> Id<T> {
        let index = self.slots.len() as u32;
        self.slots.push(Some(value));
        Id::new(index)
    }

    /// Tombstones the slot, returning the removed value.
    ///
    /// # Panics
    /// Panics if `id` is out of range or already removed — every `Id<T>`
    /// passed here is expected to come from a live leaf or neighbor link, and
    /// failing that expectation is exactly the structural-corruption class of
    /// bug `PlannerError` exists for at the call sites that can detect it.
    pub fn remove(&mut self, id: Id<T>) -> T {
        self.slots[id.index()].take().expect("arena slot already removed")
    }

    pub fn get(&self, id: Id<T>) -> &T {
        self.slots[id.index()].as_ref().expect("arena slot has been removed")
    }

    pub fn get_mut(&mut self, id: Id<T>) -> &mut T {
        self.slots[id.index()].as_mut().expect("arena slot has been removed")
    }

    pub fn is_live(&self, id: Id<T>) -> bool {
        matches!(self.slots.get(id.index()), Some(Some(_)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (Id::new(i as u32), v)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A trapezoid in the decomposition. See `SPEC_FULL.md` §3 for the full
/// description of what each field and neighbor slot means.
#[derive(Debug, Clone)]
pub struct Trapezoid {
    pub top: SegmentId,
    pub bottom: SegmentId,
    pub leftp: Point,
    pub rightp: Point,
    pub upper_left: Option<TrapezoidId>,
    pub lower_left: Option<TrapezoidId>,
    pub upper_right: Option<TrapezoidId>,
    pub lower_right: Option<TrapezoidId>,
    /// The leaf in the search DAG whose `trapezoid` is `self`. Mutual with
    /// `DagNode::Leaf::trapezoid` — the two must always be updated together.
    pub node: NodeId,
    /// Set by the free-space filter (`free_space.rs`). A filtered trapezoid's
    /// arena slot and DAG leaf stay live: point queries that land in an
    /// obstacle still resolve to a leaf, which the path query then reports as
    /// forbidden, rather than resolving to nothing.
    pub filtered: bool,
}

impl Trapezoid {
    pub fn new(
        top: SegmentId,
        bottom: SegmentId,
        leftp: Point,
        rightp: Point,
        node: NodeId,
    ) -> Self {
        Trapezoid {
            top,
            bottom,
            leftp,
            rightp,
            upper_left: None,
            lower_left: None,
            upper_right: None,
            lower_right: None,
            node,
            filtered: false,
        }
    }
}

/// A node of the point-location search DAG (`SPEC_FULL.md` §3/§4.C).
#[derive(Debug, Clone)]
pub enum DagNode {
    /// Splits on a point's x-coordinate: `left` holds everything strictly
    /// left of `point.x`, `right` everything else.
    X { point: Point, left: NodeId, right: NodeId },
    /// Splits on position relative to a segment: `above` holds points the
    /// segment classifies as above, `below` everything else.
    Y { segment: SegmentId, above: NodeId, below: NodeId },
    /// A leaf referencing the trapezoid it bounds.
    Leaf { trapezoid: TrapezoidId },
}

/// Marker types for the three arenas a [`crate::map::TrapezoidalMap`] owns.
pub type TrapezoidId = Id<Trapezoid>;
pub type NodeId = Id<DagNode>;
pub type SegmentId = Id<crate::geometry::Segment>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn insert_then_get_round_trips() {
        let mut arena: Arena<&'static str> = Arena::new();
        let id = arena.insert("hello");
        assert_eq!(*arena.get(id), "hello");
    }

    #[test]
    fn remove_tombstones_without_shifting_other_ids() {
        let mut arena: Arena<i32> = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        arena.remove(a);
        assert!(!arena.is_live(a));
        assert!(arena.is_live(b));
        assert_eq!(*arena.get(b), 2);
    }

    #[test]
    fn ids_of_different_types_are_distinct_types() {
        let mut arena: Arena<Marker> = Arena::new();
        let id = arena.insert(Marker);
        // The point of this test is that it compiles: `Id<Marker>` cannot be
        // confused with `Id<i32>` or any other `Id<U>`.
        assert_eq!(id, id);
    }
}
