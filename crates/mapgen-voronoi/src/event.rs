//! The sweep event queue.
//!
//! Events live in a slotmap arena; a priority queue orders their handles by
//! `(y, x, insertion sequence)`, so the pop order is deterministic for any
//! input and same-height sites fire left to right. Removing an invalidated
//! arc-removal event drops it from both structures; the generation tag in
//! the handle keeps any stale reference from resolving afterwards.

use crate::beachline::NodeId;
use mapgen_dcel::FaceId;
use mapgen_math::Point2;
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use slotmap::{new_key_type, SlotMap};
use std::cmp::Reverse;

new_key_type! {
    /// Handle for a scheduled event.
    pub struct EventId;
}

/// A scheduled sweep event.
#[derive(Debug, Clone)]
pub enum Event {
    /// The sweep reaches a new site: insert its arc into the beachline.
    AddArc {
        /// The face grown from the site.
        face: FaceId,
        /// The site itself.
        site: Point2,
    },
    /// Three adjacent arcs meet: the middle arc vanishes at `center`.
    RemoveArc {
        /// The beachline arc to remove.
        arc: NodeId,
        /// Where the enclosing breakpoints meet (the new Voronoi vertex).
        center: Point2,
    },
}

/// Queue position. Derived `Ord` is lexicographic over the field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct QueueKey {
    y: OrderedFloat<f64>,
    x: OrderedFloat<f64>,
    seq: u64,
}

/// Min-ordered mutable event queue over an event arena.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: SlotMap<EventId, Event>,
    order: PriorityQueue<EventId, Reverse<QueueKey>>,
    seq: u64,
}

impl EventQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scheduled events.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Schedule `event` at sweep coordinate `y`, with `x` breaking ties.
    pub fn push(&mut self, event: Event, y: f64, x: f64) -> EventId {
        let id = self.events.insert(event);
        let key = QueueKey {
            y: OrderedFloat(y),
            x: OrderedFloat(x),
            seq: self.seq,
        };
        self.seq += 1;
        self.order.push(id, Reverse(key));
        id
    }

    /// The sweep coordinate of the next event, if any.
    pub fn peek(&self) -> Option<f64> {
        self.order.peek().map(|(_, p)| p.0.y.into_inner())
    }

    /// Pop the next event together with its handle and sweep coordinate.
    pub fn pop(&mut self) -> Option<(EventId, Event, f64)> {
        let (id, Reverse(key)) = self.order.pop()?;
        let event = self
            .events
            .remove(id)
            .expect("queued event missing from the arena");
        Some((id, event, key.y.into_inner()))
    }

    /// Remove a scheduled event before it fires. Removing an already-popped
    /// or already-removed event is a no-op.
    pub fn remove(&mut self, id: EventId) {
        if self.order.remove(&id).is_some() {
            self.events.remove(id);
        }
    }
}
