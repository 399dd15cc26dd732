#![forbid(unsafe_code)]

//! Dragging: moving nodes without fighting the layout simulation.
//!
//! # Role in nodegrip
//! `nodegrip-drag` hosts [`DragCoordinator`]. While a node is dragged the
//! coordinator owns it: the node is pinned (its fixed-position override is
//! set, so the simulation stops moving it), incoming cursor targets are
//! smoothed, and on release the pin is dropped either immediately or after a
//! cancelable delay that lets the layout settle around the new position.
//!
//! The node data itself lives in a host-owned [`NodeStore`] handed to each
//! call; the coordinator never keeps a reference to it.
//!
//! # Primary responsibilities
//! - **DragSession**: start/current/last position and pointer offset.
//! - **Smoothing**: `current = lerp(current, target, 1 - smoothing)`.
//! - **Pin ownership**: explicit pin/unpin plus drag-scoped pins.
//! - **UnpinTimers**: a deadline heap with per-node generations so a
//!   re-dragged node's stale timer never fires.

pub mod config;
pub mod coordinator;
pub mod event;
pub mod session;
pub mod store;
pub mod timers;

pub use config::DragConfig;
pub use coordinator::DragCoordinator;
pub use event::{DragEvent, DragEventKind};
pub use session::DragSession;
pub use store::{NodeStore, PositionAccessor, VecNodeStore};
pub use timers::UnpinTimers;
