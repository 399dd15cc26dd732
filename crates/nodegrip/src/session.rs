#![forbid(unsafe_code)]

//! One interactive graph view: controller, drag coordinator and hit tester
//! wired together.
//!
//! # Control Flow
//!
//! ```text
//! InputEvent ──► ManipulationController ──► InteractionEvent*
//!                   │  hover/press lookup          │
//!                   ▼                              ▼  dragStart/drag/dragEnd/dragCancel
//!               HitTester::pick              DragCoordinator ──► NodeStore
//! ```
//!
//! The hit tester is shared between the session and the controller's
//! lookup closure. The lookup borrows it only for the duration of one pick;
//! a pick attempted while the session itself holds the borrow reports no
//! node rather than panicking.
//!
//! The node store stays with the host and is passed to every call that may
//! move or pin a node.

use std::cell::RefCell;
use std::rc::Rc;

use nodegrip_core::{Camera, InputEvent, ListenerId, NodeIndex, NodeRecord};
use nodegrip_drag::{DragCoordinator, DragEvent, DragEventKind, NodeStore, PositionAccessor};
use nodegrip_interact::{InteractionEvent, InteractionKind, ManipulationController, OrbitControl};
use nodegrip_pick::{HitTester, InstanceSource, PickTarget, SoftwarePickTarget};
use tracing::{debug, trace};
use web_time::Instant;

use crate::config::InteractionConfig;
use crate::error::Result;

/// Everything one [`GraphInteraction::handle`] or
/// [`GraphInteraction::tick`] call produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    /// Semantic interactions, in dispatch order.
    pub interactions: Vec<InteractionEvent>,
    /// Nodes whose deferred unpin fired.
    pub released: Vec<NodeIndex>,
}

impl FrameOutput {
    /// Whether nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty() && self.released.is_empty()
    }

    /// Kinds of the produced interactions, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<InteractionKind> {
        self.interactions.iter().map(|e| e.kind).collect()
    }
}

/// Interaction session for one graph view.
pub struct GraphInteraction {
    controller: ManipulationController,
    drag: DragCoordinator,
    hit: Rc<RefCell<HitTester>>,
    config: InteractionConfig,
}

impl std::fmt::Debug for GraphInteraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphInteraction")
            .field("controller", &self.controller)
            .field("drag", &self.drag)
            .field("hit", &self.hit.try_borrow().map(|h| h.node_count()).ok())
            .finish()
    }
}

impl GraphInteraction {
    /// Session rendering picks through `target`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Validation`](crate::ConfigError::Validation) when
    /// `config` is out of range.
    pub fn new(config: InteractionConfig, target: impl PickTarget + 'static) -> Result<Self> {
        let config = config.validated()?;
        let hit = Rc::new(RefCell::new(HitTester::with_config(
            target,
            config.to_pick_config(),
        )));
        let mut controller = ManipulationController::new(config.to_controller_config());
        let lookup = Rc::clone(&hit);
        controller.set_lookup(move |x, y| lookup.try_borrow_mut().ok()?.pick(x, y));
        let drag = DragCoordinator::new(config.to_drag_config());
        debug!("graph interaction session created");
        Ok(Self {
            controller,
            drag,
            hit,
            config,
        })
    }

    /// Session backed by the CPU pick rasterizer.
    pub fn software(config: InteractionConfig) -> Result<Self> {
        Self::new(config, SoftwarePickTarget::new())
    }

    /// Session picking through a headless GPU device of its own.
    #[cfg(feature = "gpu")]
    pub fn gpu(config: InteractionConfig) -> Result<Self> {
        Self::new(config, nodegrip_pick::GpuPickTarget::new()?)
    }

    /// Configuration the session was built with.
    #[must_use]
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    // --- Collaborators ---

    /// Set the camera for both cursor unprojection and picking.
    pub fn set_camera(&mut self, camera: Camera) {
        self.controller.set_camera(camera);
        if let Ok(mut hit) = self.hit.try_borrow_mut() {
            hit.set_camera(camera);
        }
    }

    /// Camera-orbit collaborator, disabled while dragging.
    pub fn set_orbit(&mut self, orbit: impl OrbitControl + 'static) {
        self.controller.set_orbit(orbit);
    }

    /// Resolve node records for interaction events.
    pub fn set_node_lookup(&mut self, lookup: impl Fn(NodeIndex) -> Option<NodeRecord> + 'static) {
        self.controller.set_node_lookup(lookup);
    }

    /// Layout engine position accessor used by the drag coordinator.
    pub fn set_position_accessor(&mut self, accessor: impl PositionAccessor + 'static) {
        self.drag.set_accessor(accessor);
    }

    // --- Scene ---

    /// Regenerate pick colors after the node count changed.
    ///
    /// # Errors
    ///
    /// [`PickError::CapacityExceeded`](nodegrip_pick::PickError) beyond
    /// 2^24 - 1 nodes; the previous mapping stays in effect.
    pub fn assign_colors(&mut self, node_count: usize) -> Result<()> {
        self.hit_mut()?.assign_colors(node_count)?;
        Ok(())
    }

    /// Mirror the visible scene's instance transforms for picking.
    pub fn sync_instances<I: InstanceSource + ?Sized>(&mut self, source: &I) -> usize {
        self.hit
            .try_borrow_mut()
            .map(|mut hit| hit.sync_instances(source))
            .unwrap_or(0)
    }

    /// Node under a screen point, bypassing the controller.
    pub fn pick(&mut self, x: f32, y: f32) -> Option<NodeIndex> {
        self.hit.try_borrow_mut().ok()?.pick(x, y)
    }

    // --- Input ---

    /// Feed one raw input event.
    ///
    /// Drag interactions are forwarded to the drag coordinator, which moves
    /// and pins nodes in `store`.
    pub fn handle<S: NodeStore + ?Sized>(
        &mut self,
        store: &mut S,
        event: &InputEvent,
        now: Instant,
    ) -> FrameOutput {
        let interactions = self.controller.handle(event, now);
        self.forward(store, &interactions, now);
        FrameOutput {
            interactions,
            released: Vec::new(),
        }
    }

    /// Per-frame work: evaluate coalesced hover samples and fire due unpins.
    pub fn tick<S: NodeStore + ?Sized>(&mut self, store: &mut S, now: Instant) -> FrameOutput {
        let interactions = self.controller.tick(now);
        self.forward(store, &interactions, now);
        let released = self.drag.tick(store, now);
        if !released.is_empty() {
            trace!(count = released.len(), "deferred unpins fired");
        }
        FrameOutput {
            interactions,
            released,
        }
    }

    fn forward<S: NodeStore + ?Sized>(
        &mut self,
        store: &mut S,
        interactions: &[InteractionEvent],
        now: Instant,
    ) {
        for event in interactions.iter().filter(|e| e.kind.is_drag()) {
            match event.kind {
                InteractionKind::DragStart => {
                    if let Some(node) = event.node {
                        self.drag.start_drag(store, node, event.world);
                    }
                }
                InteractionKind::Drag => {
                    self.drag.update_drag(store, event.world);
                }
                InteractionKind::DragEnd => {
                    self.drag.end_drag(store, now);
                }
                InteractionKind::DragCancel => {
                    self.drag.cancel_drag(store);
                }
                _ => {}
            }
        }
    }

    // --- Listeners ---

    /// Listen for one interaction kind.
    pub fn on(
        &mut self,
        kind: InteractionKind,
        listener: impl FnMut(&InteractionEvent) + 'static,
    ) -> ListenerId {
        self.controller.on(kind, listener)
    }

    /// Listen for every interaction.
    pub fn on_any(&mut self, listener: impl FnMut(&InteractionEvent) + 'static) -> ListenerId {
        self.controller.on_any(listener)
    }

    /// Remove an interaction listener.
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.controller.off(id)
    }

    /// Listen for every drag position update.
    pub fn on_drag(&mut self, listener: impl FnMut(&DragEvent) + 'static) -> ListenerId {
        self.drag.on_drag(listener)
    }

    /// Listen for one drag event kind.
    pub fn on_drag_kind(
        &mut self,
        kind: DragEventKind,
        listener: impl FnMut(&DragEvent) + 'static,
    ) -> ListenerId {
        self.drag.on(kind, listener)
    }

    /// Remove a drag listener.
    pub fn off_drag(&mut self, id: ListenerId) -> bool {
        self.drag.off(id)
    }

    // --- Lifecycle ---

    /// Resume handling input.
    pub fn attach(&mut self) {
        self.controller.attach();
    }

    /// Stop handling input. A drag in progress is cancelled and its node
    /// restored.
    pub fn detach<S: NodeStore + ?Sized>(&mut self, store: &mut S, now: Instant) -> FrameOutput {
        let interactions = self.controller.detach();
        self.forward(store, &interactions, now);
        FrameOutput {
            interactions,
            released: Vec::new(),
        }
    }

    /// Tear everything down: listeners, timers, pins and pick resources.
    ///
    /// Every pin the coordinator holds is released in `store`.
    pub fn dispose<S: NodeStore + ?Sized>(&mut self, store: &mut S) {
        self.controller.dispose();
        self.drag.dispose(store);
        if let Ok(mut hit) = self.hit.try_borrow_mut() {
            hit.dispose();
        }
        debug!("graph interaction session disposed");
    }

    // --- Accessors ---

    /// The manipulation controller.
    #[must_use]
    pub fn controller(&self) -> &ManipulationController {
        &self.controller
    }

    /// The drag coordinator.
    #[must_use]
    pub fn drag(&self) -> &DragCoordinator {
        &self.drag
    }

    /// Mutable drag coordinator, for explicit `pin`/`unpin`.
    pub fn drag_mut(&mut self) -> &mut DragCoordinator {
        &mut self.drag
    }

    /// Shared handle to the hit tester.
    #[must_use]
    pub fn hit_tester(&self) -> Rc<RefCell<HitTester>> {
        Rc::clone(&self.hit)
    }

    fn hit_mut(&self) -> Result<std::cell::RefMut<'_, HitTester>> {
        self.hit.try_borrow_mut().map_err(|_| {
            nodegrip_pick::PickError::ReadbackUnavailable("hit tester is busy".into()).into()
        })
    }
}
