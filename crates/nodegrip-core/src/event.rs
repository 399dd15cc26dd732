#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! These are the raw device events the manipulation controller consumes.
//! Host integrations (winit, web-sys, a test harness) translate their native
//! events into [`InputEvent`] before handing them over.
//!
//! # Design Notes
//!
//! - Pointer coordinates are physical pixels, origin top-left, y down.
//! - Touch events carry only the *changed* touch points for the phase.
//! - `KeyEventKind` defaults to `Press` when the host cannot distinguish.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;
use glam::Vec2;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse or pen pointer event.
    Pointer(PointerEvent),

    /// Touch screen event.
    Touch(TouchEvent),

    /// Scroll wheel or trackpad zoom gesture.
    Wheel(WheelEvent),

    /// A keyboard event.
    Key(KeyEvent),

    /// The input surface lost focus (window blur, device disconnected).
    FocusLost,
}

impl InputEvent {
    /// Screen position carried by the event, if any.
    ///
    /// For touch events this is the first changed touch point.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        match self {
            Self::Pointer(p) => Some(p.position()),
            Self::Touch(t) => t.touches.first().map(|tp| Vec2::new(tp.x, tp.y)),
            Self::Wheel(w) => Some(Vec2::new(w.x, w.y)),
            Self::Key(_) | Self::FocusLost => None,
        }
    }
}

/// A pointer (mouse/pen) event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// The type of pointer event.
    pub kind: PointerEventKind,

    /// X coordinate in pixels.
    pub x: f32,

    /// Y coordinate in pixels.
    pub y: f32,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Primary-button press at `(x, y)`.
    #[must_use]
    pub const fn down(x: f32, y: f32) -> Self {
        Self::new(PointerEventKind::Down(PointerButton::Primary), x, y)
    }

    /// Primary-button release at `(x, y)`.
    #[must_use]
    pub const fn up(x: f32, y: f32) -> Self {
        Self::new(PointerEventKind::Up(PointerButton::Primary), x, y)
    }

    /// Pointer movement to `(x, y)`.
    #[must_use]
    pub const fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerEventKind::Move, x, y)
    }

    /// Create a pointer event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Position as a vector.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed.
    Down(PointerButton),

    /// Button released.
    Up(PointerButton),

    /// Pointer moved (with or without a held button).
    Move,
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerButton {
    /// Left button / pen tip / touch contact.
    #[default]
    Primary,

    /// Right button.
    Secondary,

    /// Middle button.
    Middle,
}

/// Touch phase for a batch of changed touch points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// New contacts started.
    Start,
    /// Existing contacts moved.
    Move,
    /// Contacts lifted.
    End,
    /// Contacts aborted by the platform.
    Cancel,
}

/// A single touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Platform-assigned contact identifier, stable for the contact lifetime.
    pub id: u64,
    /// X coordinate in pixels.
    pub x: f32,
    /// Y coordinate in pixels.
    pub y: f32,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub const fn new(id: u64, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// A touch event.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    /// Phase for all changed contacts.
    pub phase: TouchPhase,
    /// Contacts that changed in this phase.
    pub touches: Vec<TouchPoint>,
}

impl TouchEvent {
    /// Create a touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self { phase, touches }
    }

    /// Find a changed contact by id.
    #[must_use]
    pub fn find(&self, id: u64) -> Option<&TouchPoint> {
        self.touches.iter().find(|t| t.id == id)
    }
}

impl From<TouchEvent> for InputEvent {
    fn from(event: TouchEvent) -> Self {
        Self::Touch(event)
    }
}

/// A wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Horizontal scroll delta.
    pub delta_x: f32,
    /// Vertical scroll delta (positive = away from the user).
    pub delta_y: f32,
    /// Cursor X coordinate in pixels.
    pub x: f32,
    /// Cursor Y coordinate in pixels.
    pub y: f32,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl WheelEvent {
    /// Vertical wheel event at `(x, y)`.
    #[must_use]
    pub const fn vertical(delta_y: f32, x: f32, y: f32) -> Self {
        Self {
            delta_x: 0.0,
            delta_y,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }
}

impl From<WheelEvent> for InputEvent {
    fn from(event: WheelEvent) -> Self {
        Self::Wheel(event)
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}

/// Key codes the interaction layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Escape key.
    Escape,

    /// Enter/Return key.
    Enter,

    /// Delete key.
    Delete,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}
