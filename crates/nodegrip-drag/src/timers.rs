#![forbid(unsafe_code)]

//! Deferred unpin timers.
//!
//! A min-heap ordered by deadline holds every timer ever scheduled; the live
//! table maps each node to the generation of its one current timer.
//! Rescheduling or cancelling only touches the live table. Heap entries whose
//! generation no longer matches are stale and are discarded when popped.
//!
//! # Invariants
//!
//! 1. At most one live timer per node.
//! 2. Due timers pop in `(deadline, node)` order.
//! 3. A cancelled or superseded timer never pops.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use nodegrip_core::NodeIndex;
use web_time::Instant;

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    deadline: Instant,
    node: NodeIndex,
    generation: u64,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earliest deadline comes first (inverted for the max-heap).
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| other.generation.cmp(&self.generation))
    }
}

/// Pending unpin actions, one per node at most.
#[derive(Debug, Clone, Default)]
pub struct UnpinTimers {
    heap: BinaryHeap<TimerEntry>,
    live: AHashMap<NodeIndex, (u64, Instant)>,
    next_generation: u64,
}

impl UnpinTimers {
    /// Create an empty timer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `node` to unpin at `deadline`, superseding any pending timer
    /// for it. Returns the superseded deadline.
    pub fn schedule(&mut self, node: NodeIndex, deadline: Instant) -> Option<Instant> {
        self.next_generation = self.next_generation.wrapping_add(1);
        let generation = self.next_generation;
        self.heap.push(TimerEntry {
            deadline,
            node,
            generation,
        });
        self.live
            .insert(node, (generation, deadline))
            .map(|(_, previous)| previous)
    }

    /// Cancel the pending timer for `node`. Returns `true` if one existed.
    pub fn cancel(&mut self, node: NodeIndex) -> bool {
        let cancelled = self.live.remove(&node).is_some();
        if self.live.is_empty() {
            self.heap.clear();
        }
        cancelled
    }

    /// Deadline of the pending timer for `node`.
    #[must_use]
    pub fn deadline(&self, node: NodeIndex) -> Option<Instant> {
        self.live.get(&node).map(|(_, deadline)| *deadline)
    }

    /// Earliest live deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.live.values().map(|(_, deadline)| *deadline).min()
    }

    /// Pop the next timer due at `now`, skipping stale entries.
    pub fn pop_due(&mut self, now: Instant) -> Option<NodeIndex> {
        while let Some(entry) = self.heap.peek().copied() {
            if entry.deadline > now {
                return None;
            }
            self.heap.pop();
            if self
                .live
                .get(&entry.node)
                .is_some_and(|(generation, _)| *generation == entry.generation)
            {
                self.live.remove(&entry.node);
                return Some(entry.node);
            }
        }
        None
    }

    /// Remove every pending timer, returning their nodes in
    /// `(deadline, node)` order.
    pub fn drain(&mut self) -> Vec<NodeIndex> {
        let mut pending: Vec<(Instant, NodeIndex)> = self
            .live
            .drain()
            .map(|(node, (_, deadline))| (deadline, node))
            .collect();
        pending.sort_unstable();
        self.heap.clear();
        pending.into_iter().map(|(_, node)| node).collect()
    }

    /// Number of live timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
