#![forbid(unsafe_code)]

//! Core: node identity, input events, camera math, and listener dispatch.
//!
//! # Role in nodegrip
//! `nodegrip-core` is the shared kernel under the three interaction
//! components. It owns nothing stateful about the graph; it only defines the
//! vocabulary the hit tester, the manipulation controller, and the drag
//! coordinator exchange.
//!
//! # Primary responsibilities
//! - **NodeIndex**: dense instance-slot identity, stable between rebuilds.
//! - **InputEvent**: normalized pointer, touch, wheel, keyboard, and focus input.
//! - **Camera**: world/screen projection, including the off-axis 1-pixel
//!   frustum used by offscreen picking.
//! - **ListenerRegistry**: ordered callback dispatch with per-listener
//!   failure isolation.

pub mod camera;
pub mod dispatch;
pub mod event;
pub mod geometry;
pub mod node;

pub use camera::Camera;
pub use dispatch::{DispatchReport, ListenerId, ListenerRegistry};
pub use event::{
    InputEvent, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerButton, PointerEvent,
    PointerEventKind, TouchEvent, TouchPhase, TouchPoint, WheelEvent,
};
pub use geometry::{Mat4, Quat, Vec2, Vec3, Viewport};
pub use node::{NodeIndex, NodeLookup, NodeRecord};
