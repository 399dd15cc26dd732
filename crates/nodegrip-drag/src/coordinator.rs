#![forbid(unsafe_code)]

//! The drag coordinator: pinning, smoothing, and deferred release.
//!
//! # Usage
//!
//! ```
//! use nodegrip_core::{NodeIndex, Vec3};
//! use nodegrip_drag::{DragCoordinator, NodeStore, VecNodeStore};
//! use web_time::{Duration, Instant};
//!
//! let mut store = VecNodeStore::new(vec![Vec3::ZERO]);
//! let mut drag = DragCoordinator::default();
//! let node = NodeIndex::new(0);
//! let t = Instant::now();
//!
//! drag.start_drag(&mut store, node, Vec3::ZERO);
//! drag.update_drag(&mut store, Vec3::new(10.0, 0.0, 0.0));
//! drag.end_drag(&mut store, t);
//! assert!(store.fixed(node).is_some());
//!
//! // The pin is released once the unpin delay elapses.
//! drag.tick(&mut store, t + Duration::from_millis(2000));
//! assert!(store.fixed(node).is_none());
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Out-of-range node | Stale index after a rebuild | Operation is a no-op |
//! | No active drag | `update_drag`/`end_drag` without `start_drag` | No-op |
//! | Overlapping drags | `start_drag` while active | Previous drag ends, pin kept |
//! | Listener panic | Bug in subscriber | Isolated; remaining listeners run |

use ahash::AHashSet;
use nodegrip_core::{ListenerId, ListenerRegistry, NodeIndex, Vec3};
use tracing::{debug, trace};
use web_time::Instant;

use crate::config::DragConfig;
use crate::event::{DragEvent, DragEventKind};
use crate::session::DragSession;
use crate::store::{NodeStore, PositionAccessor};
use crate::timers::UnpinTimers;

/// Owns drag sessions, pins, and unpin timers for one graph.
pub struct DragCoordinator {
    config: DragConfig,
    active: Option<DragSession>,
    pinned: AHashSet<NodeIndex>,
    timers: UnpinTimers,
    accessor: Option<Box<dyn PositionAccessor>>,
    listeners: ListenerRegistry<DragEventKind, DragEvent>,
}

impl std::fmt::Debug for DragCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragCoordinator")
            .field("config", &self.config)
            .field("active", &self.active.map(|s| s.node))
            .field("pinned", &self.pinned.len())
            .field("pending_unpins", &self.timers.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for DragCoordinator {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}

impl DragCoordinator {
    /// Create a coordinator. `smoothing` is clamped into `[0, 1)`.
    #[must_use]
    pub fn new(config: DragConfig) -> Self {
        Self {
            config: config.sanitized(),
            active: None,
            pinned: AHashSet::new(),
            timers: UnpinTimers::new(),
            accessor: None,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Replace the configuration for subsequent drags.
    pub fn set_config(&mut self, config: DragConfig) {
        self.config = config.sanitized();
    }

    /// Use the layout engine's position accessor for reads and writes.
    pub fn set_accessor(&mut self, accessor: impl PositionAccessor + 'static) {
        self.accessor = Some(Box::new(accessor));
    }

    /// Stop using the position accessor.
    pub fn clear_accessor(&mut self) {
        self.accessor = None;
    }

    // --- Listeners ---

    /// Listen for every drag event.
    pub fn on_drag(&mut self, listener: impl FnMut(&DragEvent) + 'static) -> ListenerId {
        self.listeners.on_any(listener)
    }

    /// Listen for one drag event kind.
    pub fn on(
        &mut self,
        kind: DragEventKind,
        listener: impl FnMut(&DragEvent) + 'static,
    ) -> ListenerId {
        self.listeners.on(kind, listener)
    }

    /// Unsubscribe. Returns `false` for unknown ids.
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // --- Drag lifecycle ---

    /// Begin dragging `node`, grabbed at world point `pointer`.
    ///
    /// Returns `false` (and does nothing) for an unknown node.
    pub fn start_drag<S: NodeStore + ?Sized>(
        &mut self,
        store: &mut S,
        node: NodeIndex,
        pointer: Vec3,
    ) -> bool {
        if !node.is_within(store.node_count()) {
            trace!(node = node.get(), "start_drag ignored: unknown node");
            return false;
        }
        let Some(start) = self.read_position(store, node) else {
            return false;
        };

        if let Some(previous) = self.active.take() {
            // Ends without releasing; the previous node stays pinned.
            self.emit(DragEvent::End {
                node: previous.node,
                position: previous.current,
            });
        }

        if self.timers.cancel(node) {
            debug!(node = node.get(), "pending unpin cancelled by new drag");
        }
        if self.config.pin_on_drag {
            self.pin_at(store, node, start);
        }

        self.active = Some(DragSession::new(node, start, pointer, self.config));
        debug!(node = node.get(), x = start.x, y = start.y, z = start.z, "drag started");
        self.emit(DragEvent::Start {
            node,
            position: start,
        });
        true
    }

    /// Move the dragged node one smoothing step towards `pointer + offset`.
    ///
    /// Returns the new position, or `None` without an active drag.
    pub fn update_drag<S: NodeStore + ?Sized>(
        &mut self,
        store: &mut S,
        pointer: Vec3,
    ) -> Option<Vec3> {
        let session = self.active.as_mut()?;
        let node = session.node;
        if !node.is_within(store.node_count()) {
            return None;
        }
        let delta = session.advance(pointer);
        let position = session.current;

        store.set_position(node, position);
        if self.pinned.contains(&node) {
            store.set_fixed(node, Some(position.truncate()));
        }
        if let Some(accessor) = self.accessor.as_mut() {
            accessor.set(node, position);
        }
        trace!(node = node.get(), x = position.x, y = position.y, "drag update");
        self.emit(DragEvent::Move {
            node,
            position,
            delta,
        });
        Some(position)
    }

    /// Finish the active drag and apply the release policy.
    ///
    /// Returns the dragged node, or `None` without an active drag.
    pub fn end_drag<S: NodeStore + ?Sized>(
        &mut self,
        store: &mut S,
        now: Instant,
    ) -> Option<NodeIndex> {
        let session = self.active.take()?;
        let node = session.node;
        debug!(node = node.get(), "drag ended");
        self.emit(DragEvent::End {
            node,
            position: session.current,
        });

        if session.config.unpin_on_release && self.pinned.contains(&node) {
            if session.config.unpin_delay.is_zero() {
                self.release(store, node);
            } else {
                let deadline = now + session.config.unpin_delay;
                self.timers.schedule(node, deadline);
                debug!(
                    node = node.get(),
                    delay_ms = session.config.unpin_delay.as_millis() as u64,
                    "unpin scheduled"
                );
            }
        }
        Some(node)
    }

    /// Abort the active drag: restore the start position and unpin now.
    ///
    /// Returns the dragged node, or `None` without an active drag.
    pub fn cancel_drag<S: NodeStore + ?Sized>(&mut self, store: &mut S) -> Option<NodeIndex> {
        let session = self.active.take()?;
        let node = session.node;
        store.set_position(node, session.start);
        if let Some(accessor) = self.accessor.as_mut() {
            accessor.set(node, session.start);
        }
        self.release(store, node);
        debug!(node = node.get(), "drag cancelled");
        self.emit(DragEvent::Cancel {
            node,
            position: session.start,
        });
        Some(node)
    }

    /// Fire every unpin timer due at `now`, in deadline order.
    ///
    /// Returns the released nodes.
    pub fn tick<S: NodeStore + ?Sized>(&mut self, store: &mut S, now: Instant) -> Vec<NodeIndex> {
        let mut released = Vec::new();
        while let Some(node) = self.timers.pop_due(now) {
            self.release(store, node);
            released.push(node);
        }
        released
    }

    // --- Explicit pins ---

    /// Pin `node` at its current position, cancelling any pending unpin.
    ///
    /// Returns `false` for an unknown node.
    pub fn pin<S: NodeStore + ?Sized>(&mut self, store: &mut S, node: NodeIndex) -> bool {
        if !node.is_within(store.node_count()) {
            return false;
        }
        let Some(position) = self.read_position(store, node) else {
            return false;
        };
        self.timers.cancel(node);
        self.pin_at(store, node, position);
        true
    }

    /// Release `node` now, cancelling any pending unpin.
    ///
    /// Returns `true` if the node was pinned.
    pub fn unpin<S: NodeStore + ?Sized>(&mut self, store: &mut S, node: NodeIndex) -> bool {
        if !node.is_within(store.node_count()) {
            return false;
        }
        let was_pinned = self.pinned.contains(&node);
        self.release(store, node);
        was_pinned
    }

    // --- Queries ---

    /// Whether the coordinator holds a pin on `node`.
    #[must_use]
    pub fn is_pinned(&self, node: NodeIndex) -> bool {
        self.pinned.contains(&node)
    }

    /// When the pending unpin for `node` fires, if one is scheduled.
    #[must_use]
    pub fn pending_unpin(&self, node: NodeIndex) -> Option<Instant> {
        self.timers.deadline(node)
    }

    /// Earliest pending unpin across all nodes.
    #[must_use]
    pub fn next_unpin(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// The drag in progress.
    #[must_use]
    pub fn active(&self) -> Option<&DragSession> {
        self.active.as_ref()
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Tear down: drop the active drag, release every pin (pending timers
    /// first, in deadline order, then the rest by index) and clear listeners.
    ///
    /// No events are dispatched and no timer can fire afterwards.
    pub fn dispose<S: NodeStore + ?Sized>(&mut self, store: &mut S) {
        self.active = None;
        for node in self.timers.drain() {
            self.release(store, node);
        }
        let mut remaining: Vec<NodeIndex> = self.pinned.iter().copied().collect();
        remaining.sort_unstable();
        for node in remaining {
            self.release(store, node);
        }
        self.listeners.clear();
        self.accessor = None;
        debug!("drag coordinator disposed");
    }

    // --- Internals ---

    fn read_position<S: NodeStore + ?Sized>(&self, store: &S, node: NodeIndex) -> Option<Vec3> {
        self.accessor
            .as_ref()
            .and_then(|accessor| accessor.get(node))
            .or_else(|| store.position(node))
    }

    fn pin_at<S: NodeStore + ?Sized>(&mut self, store: &mut S, node: NodeIndex, position: Vec3) {
        store.set_fixed(node, Some(position.truncate()));
        if self.pinned.insert(node) {
            debug!(node = node.get(), "node pinned");
        }
    }

    fn release<S: NodeStore + ?Sized>(&mut self, store: &mut S, node: NodeIndex) {
        self.timers.cancel(node);
        if self.pinned.remove(&node) {
            store.set_fixed(node, None);
            debug!(node = node.get(), "node unpinned");
        }
    }

    fn emit(&mut self, event: DragEvent) {
        self.listeners.dispatch(event.kind(), &event);
    }
}
