#![forbid(unsafe_code)]

//! The manipulation controller: raw input in, semantic interactions out.
//!
//! # State Machine
//!
//! The controller tracks three things at once:
//!
//! - **Hover**: on pointer moves without a press, a throttled lookup decides
//!   whether the cursor is over a node. Entering a node emits `Hover`;
//!   leaving every node emits `HoverEnd`.
//! - **Press**: pointer down records the node under the cursor (if any) as a
//!   drag candidate. Moving farther than `drag_threshold` from the press
//!   point promotes the candidate to a drag (`DragStart`, then `Drag` per
//!   move). Releasing within the threshold is a `Click`.
//! - **Selection**: a click toggles the selected node; clicking empty space
//!   or pressing Escape clears it.
//!
//! # Invariants
//!
//! 1. `Click` and `DragStart` never both emit for one press/release.
//! 2. At most one hovered, one selected and one dragged node.
//! 3. Every `DragStart` is followed by exactly one `DragEnd` or `DragCancel`.
//! 4. The orbit control is disabled exactly while a drag is active.
//! 5. Hover evaluation and drag handling never both run for one move.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | No hit lookup | Host never called `set_lookup` | Hover/click/select are no-ops; state stays `Idle` |
//! | No camera | `set_camera` never called | World position = `(x, y, 0)` |
//! | Focus lost mid-drag | Window blur | `DragCancel`, orbit re-enabled |
//! | Listener panic | Bug in subscriber | Isolated; remaining listeners run |
//! | Detached | `detach()` called | Input is ignored until `attach()` |

use nodegrip_core::{
    Camera, InputEvent, KeyCode, KeyEventKind, ListenerId, ListenerRegistry, NodeIndex,
    NodeLookup, NodeRecord, PointerButton, PointerEventKind, TouchEvent, TouchPhase, Vec2, Vec3,
};
use tracing::{debug, debug_span, trace};
use web_time::Instant;

use crate::config::ControllerConfig;
use crate::event::{InteractionEvent, InteractionKind};
use crate::orbit::OrbitControl;
use crate::state::InteractionState;
use crate::throttle::HoverThrottle;

/// Screen-point hit test, usually backed by `HitTester::pick`.
pub type HitLookup = Box<dyn FnMut(f32, f32) -> Option<NodeIndex>>;

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// Device-independent pointer action.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PointerAction {
    Down(PointerButton),
    Move,
    Up(PointerButton),
    Cancel,
}

/// Tracks a pressed pointer until release.
#[derive(Debug, Clone, Copy)]
struct PressTracker {
    start: Vec2,
    node: Option<NodeIndex>,
    /// The press left the threshold radius at some point.
    moved: bool,
    /// The press was promoted to a node drag.
    dragging: bool,
}

// ---------------------------------------------------------------------------
// ManipulationController
// ---------------------------------------------------------------------------

/// Input state machine for one graph view.
///
/// Call [`handle`](Self::handle) for every raw [`InputEvent`] and
/// [`tick`](Self::tick) once per frame so coalesced hover samples are
/// evaluated after the cursor comes to rest.
pub struct ManipulationController {
    config: ControllerConfig,
    state: InteractionState,
    attached: bool,

    lookup: Option<HitLookup>,
    node_lookup: Option<NodeLookup>,
    camera: Option<Camera>,
    orbit: Option<Box<dyn OrbitControl>>,
    listeners: ListenerRegistry<InteractionKind, InteractionEvent>,

    throttle: HoverThrottle<(Vec2, InputEvent)>,
    hovered: Option<NodeIndex>,
    selected: Option<NodeIndex>,
    press: Option<PressTracker>,
    active_touch: Option<u64>,
    /// Last pointer position seen, for events raised by keys or focus.
    cursor: Vec2,
}

impl std::fmt::Debug for ManipulationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManipulationController")
            .field("state", &self.state)
            .field("attached", &self.attached)
            .field("hovered", &self.hovered)
            .field("selected", &self.selected)
            .field("dragging", &self.is_dragging())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for ManipulationController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl ManipulationController {
    /// Create an attached controller with no collaborators.
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            throttle: HoverThrottle::new(config.hover_throttle),
            config,
            state: InteractionState::Idle,
            attached: true,
            lookup: None,
            node_lookup: None,
            camera: None,
            orbit: None,
            listeners: ListenerRegistry::new(),
            hovered: None,
            selected: None,
            press: None,
            active_touch: None,
            cursor: Vec2::ZERO,
        }
    }

    // --- Collaborators ---

    /// Register the screen-point hit test.
    pub fn set_lookup(&mut self, lookup: impl FnMut(f32, f32) -> Option<NodeIndex> + 'static) {
        self.lookup = Some(Box::new(lookup));
    }

    /// Remove the hit test; hover/click/select become no-ops.
    pub fn clear_lookup(&mut self) {
        self.lookup = None;
    }

    /// Register the node resolver used to fill [`InteractionEvent::record`].
    pub fn set_node_lookup(&mut self, lookup: impl Fn(NodeIndex) -> Option<NodeRecord> + 'static) {
        self.node_lookup = Some(Box::new(lookup));
    }

    /// Set the camera used to unproject cursor positions.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    /// Set the orbit control disabled during drags.
    pub fn set_orbit(&mut self, orbit: impl OrbitControl + 'static) {
        self.orbit = Some(Box::new(orbit));
    }

    // --- Listeners ---

    /// Listen for one interaction kind.
    pub fn on(
        &mut self,
        kind: InteractionKind,
        listener: impl FnMut(&InteractionEvent) + 'static,
    ) -> ListenerId {
        self.listeners.on(kind, listener)
    }

    /// Listen for every interaction kind.
    pub fn on_any(&mut self, listener: impl FnMut(&InteractionEvent) + 'static) -> ListenerId {
        self.listeners.on_any(listener)
    }

    /// Unsubscribe. Returns `false` for unknown ids.
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Listener panics caught over the controller's lifetime.
    #[must_use]
    pub fn listener_failures(&self) -> u64 {
        self.listeners.total_failures()
    }

    // --- Lifecycle ---

    /// Start accepting input.
    pub fn attach(&mut self) {
        if !self.attached {
            self.attached = true;
            debug!("controller attached");
        }
    }

    /// Stop accepting input. An active drag is cancelled; the cancel event
    /// is dispatched and returned.
    pub fn detach(&mut self) -> Vec<InteractionEvent> {
        let mut out = Vec::new();
        if self.attached {
            self.abort_press(&InputEvent::FocusLost, &mut out);
            self.throttle.reset();
            self.attached = false;
            self.set_state(InteractionState::Idle);
            debug!("controller detached");
        }
        out
    }

    /// Whether input is currently accepted.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Drop every listener and collaborator and return to `Idle`.
    ///
    /// No events are dispatched. The orbit control is re-enabled before it is
    /// dropped if a drag was active.
    pub fn dispose(&mut self) {
        if self.is_dragging()
            && let Some(orbit) = self.orbit.as_mut()
        {
            orbit.set_enabled(true);
        }
        self.listeners.clear();
        self.lookup = None;
        self.node_lookup = None;
        self.camera = None;
        self.orbit = None;
        self.throttle.reset();
        self.hovered = None;
        self.selected = None;
        self.press = None;
        self.active_touch = None;
        self.attached = false;
        self.state = InteractionState::Idle;
        debug!("controller disposed");
    }

    // --- Accessors ---

    /// Current display state.
    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Node under the cursor as of the last hover evaluation.
    #[must_use]
    pub fn hovered(&self) -> Option<NodeIndex> {
        self.hovered
    }

    /// Selected node.
    #[must_use]
    pub fn selected(&self) -> Option<NodeIndex> {
        self.selected
    }

    /// Node being dragged.
    #[must_use]
    pub fn dragged(&self) -> Option<NodeIndex> {
        self.press.filter(|p| p.dragging).and_then(|p| p.node)
    }

    /// Whether a node drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.dragging)
    }

    /// Current thresholds.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Replace the thresholds.
    pub fn set_config(&mut self, config: ControllerConfig) {
        self.throttle.set_period(config.hover_throttle);
        self.config = config;
    }

    // --- Input ---

    /// Process one raw event, dispatching and returning the interactions it
    /// produced, in order.
    pub fn handle(&mut self, event: &InputEvent, now: Instant) -> Vec<InteractionEvent> {
        let mut out = Vec::new();
        if !self.attached {
            return out;
        }
        let _span = debug_span!("controller.handle", state = %self.state).entered();

        match event {
            InputEvent::Pointer(pointer) => {
                let action = match pointer.kind {
                    PointerEventKind::Down(button) => PointerAction::Down(button),
                    PointerEventKind::Up(button) => PointerAction::Up(button),
                    PointerEventKind::Move => PointerAction::Move,
                };
                self.on_pointer(action, pointer.position(), event, now, &mut out);
            }
            InputEvent::Touch(touch) => {
                if let Some((action, pos)) = self.touch_action(touch) {
                    self.on_pointer(action, pos, event, now, &mut out);
                }
            }
            InputEvent::Wheel(wheel) => {
                // An active press keeps its own label.
                if self.press.is_none() {
                    self.set_state(InteractionState::Zooming);
                }
                if let Some(orbit) = self.orbit.as_mut() {
                    orbit.zoom(wheel.delta_y, wheel.x, wheel.y);
                }
            }
            InputEvent::Key(key) => {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Escape {
                    self.abort_press(event, &mut out);
                    if let Some(prev) = self.selected.take() {
                        let pos = self.cursor;
                        self.emit(InteractionKind::Deselect, Some(prev), pos, event, &mut out);
                    }
                }
            }
            InputEvent::FocusLost => {
                self.abort_press(event, &mut out);
                self.active_touch = None;
                self.throttle.reset();
            }
        }
        out
    }

    /// Evaluate a coalesced hover sample once the throttle period elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<InteractionEvent> {
        let mut out = Vec::new();
        if !self.attached || self.press.is_some() {
            return out;
        }
        if let Some((pos, source)) = self.throttle.poll(now) {
            self.evaluate_hover(pos, &source, &mut out);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl ManipulationController {
    /// Map a touch event onto the first active touch point.
    fn touch_action(&mut self, touch: &TouchEvent) -> Option<(PointerAction, Vec2)> {
        match touch.phase {
            TouchPhase::Start => {
                if self.active_touch.is_some() {
                    return None;
                }
                let first = touch.touches.first()?;
                self.active_touch = Some(first.id);
                Some((PointerAction::Down(PointerButton::Primary), Vec2::new(first.x, first.y)))
            }
            TouchPhase::Move => {
                let point = touch.find(self.active_touch?)?;
                Some((PointerAction::Move, Vec2::new(point.x, point.y)))
            }
            TouchPhase::End | TouchPhase::Cancel => {
                let point = *touch.find(self.active_touch?)?;
                self.active_touch = None;
                let action = if touch.phase == TouchPhase::End {
                    PointerAction::Up(PointerButton::Primary)
                } else {
                    PointerAction::Cancel
                };
                Some((action, Vec2::new(point.x, point.y)))
            }
        }
    }

    fn on_pointer(
        &mut self,
        action: PointerAction,
        pos: Vec2,
        source: &InputEvent,
        now: Instant,
        out: &mut Vec<InteractionEvent>,
    ) {
        self.cursor = pos;
        match action {
            PointerAction::Down(button) => self.on_down(pos, button, source, out),
            PointerAction::Move => self.on_move(pos, source, now, out),
            PointerAction::Up(button) => self.on_up(pos, button, source, out),
            PointerAction::Cancel => self.abort_press(source, out),
        }
    }

    fn on_down(
        &mut self,
        pos: Vec2,
        button: PointerButton,
        source: &InputEvent,
        out: &mut Vec<InteractionEvent>,
    ) {
        if button != PointerButton::Primary {
            return;
        }
        // A missed release leaves a stale press behind.
        self.abort_press(source, out);

        let Some(lookup) = self.lookup.as_mut() else {
            return;
        };
        let node = lookup(pos.x, pos.y);
        self.throttle.reset();
        self.press = Some(PressTracker {
            start: pos,
            node,
            moved: false,
            dragging: false,
        });
        self.set_state(if node.is_some() {
            InteractionState::Selecting
        } else {
            InteractionState::Panning
        });
    }

    fn on_move(
        &mut self,
        pos: Vec2,
        source: &InputEvent,
        now: Instant,
        out: &mut Vec<InteractionEvent>,
    ) {
        if let Some(press) = self.press.as_mut() {
            if press.dragging {
                let node = press.node;
                trace!(x = pos.x, y = pos.y, "drag move");
                self.emit(InteractionKind::Drag, node, pos, source, out);
                return;
            }
            if press.start.distance(pos) > self.config.drag_threshold {
                press.moved = true;
                if let Some(node) = press.node {
                    press.dragging = true;
                    if let Some(orbit) = self.orbit.as_mut() {
                        orbit.set_enabled(false);
                    }
                    self.set_state(InteractionState::Dragging);
                    debug!(node = node.get(), x = pos.x, y = pos.y, "drag started");
                    self.emit(InteractionKind::DragStart, Some(node), pos, source, out);
                }
            }
            return;
        }

        // Zooming lasts until the pointer moves again, throttled or not.
        if self.state == InteractionState::Zooming {
            self.settle_state();
        }
        if let Some((pos, source)) = self.throttle.offer((pos, source.clone()), now) {
            self.evaluate_hover(pos, &source, out);
        }
    }

    fn on_up(
        &mut self,
        pos: Vec2,
        button: PointerButton,
        source: &InputEvent,
        out: &mut Vec<InteractionEvent>,
    ) {
        if button != PointerButton::Primary {
            return;
        }
        let Some(press) = self.press.take() else {
            return;
        };

        if press.dragging {
            if let Some(orbit) = self.orbit.as_mut() {
                orbit.set_enabled(true);
            }
            self.set_state(InteractionState::Idle);
            debug!(node = ?press.node, "drag ended");
            self.emit(InteractionKind::DragEnd, press.node, pos, source, out);
            return;
        }

        if press.moved || press.start.distance(pos) > self.config.drag_threshold {
            // Background pan or a release far from the press point.
            self.settle_state();
            return;
        }

        self.emit(InteractionKind::Click, press.node, pos, source, out);
        match (press.node, self.selected) {
            (Some(node), Some(current)) if node == current => {
                self.selected = None;
                self.emit(InteractionKind::Deselect, Some(node), pos, source, out);
            }
            (Some(node), previous) => {
                if let Some(previous) = previous {
                    self.emit(InteractionKind::Deselect, Some(previous), pos, source, out);
                }
                self.selected = Some(node);
                self.emit(InteractionKind::Select, Some(node), pos, source, out);
            }
            (None, Some(previous)) => {
                self.selected = None;
                self.emit(InteractionKind::Deselect, Some(previous), pos, source, out);
            }
            (None, None) => {}
        }
        self.settle_state();
    }

    /// Drop the current press; an active drag emits `DragCancel`.
    fn abort_press(&mut self, source: &InputEvent, out: &mut Vec<InteractionEvent>) {
        let Some(press) = self.press.take() else {
            return;
        };
        if press.dragging {
            if let Some(orbit) = self.orbit.as_mut() {
                orbit.set_enabled(true);
            }
            debug!(node = ?press.node, "drag cancelled");
            let pos = self.cursor;
            self.emit(InteractionKind::DragCancel, press.node, pos, source, out);
        }
        self.settle_state();
    }

    fn evaluate_hover(&mut self, pos: Vec2, source: &InputEvent, out: &mut Vec<InteractionEvent>) {
        let Some(lookup) = self.lookup.as_mut() else {
            return;
        };
        let hit = lookup(pos.x, pos.y);
        let previous = self.hovered;
        self.hovered = hit;
        self.settle_state();

        match (previous, hit) {
            (Some(prev), Some(node)) if prev == node => {}
            (_, Some(node)) => {
                self.emit(InteractionKind::Hover, Some(node), pos, source, out);
            }
            (Some(prev), None) => {
                self.emit(InteractionKind::HoverEnd, Some(prev), pos, source, out);
            }
            (None, None) => {}
        }
    }

    /// Resting state once no press is active.
    fn settle_state(&mut self) {
        self.set_state(if self.hovered.is_some() {
            InteractionState::Hovering
        } else {
            InteractionState::Idle
        });
    }

    fn set_state(&mut self, state: InteractionState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "interaction state");
            self.state = state;
        }
    }

    fn world_at(&self, pos: Vec2) -> Vec3 {
        match &self.camera {
            Some(camera) => {
                camera.unproject_on_plane(pos.x, pos.y, self.config.interaction_plane_z)
            }
            None => pos.extend(0.0),
        }
    }

    fn emit(
        &mut self,
        kind: InteractionKind,
        node: Option<NodeIndex>,
        pos: Vec2,
        source: &InputEvent,
        out: &mut Vec<InteractionEvent>,
    ) {
        let record = match (&self.node_lookup, node) {
            (Some(resolve), Some(node)) => resolve(node),
            _ => None,
        };
        let event = InteractionEvent {
            kind,
            node,
            record,
            screen: pos,
            world: self.world_at(pos),
            source: source.clone(),
        };
        let report = self.listeners.dispatch(kind, &event);
        trace!(
            kind = %kind,
            node = ?node,
            invoked = report.invoked,
            failed = report.failed,
            "interaction dispatched"
        );
        out.push(event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
