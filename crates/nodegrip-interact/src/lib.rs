#![forbid(unsafe_code)]

//! Manipulation: what the user is doing to the graph right now.
//!
//! # Role in nodegrip
//! `nodegrip-interact` hosts [`ManipulationController`], the state machine
//! between raw device input and the semantic [`InteractionEvent`] stream
//! (hover, click, select, drag). It asks "which node is under the cursor?"
//! through an injected [`HitLookup`] and never touches node data directly.
//!
//! # Primary responsibilities
//! - **Classification**: click vs. drag by a Euclidean pixel threshold.
//! - **Hover polling**: throttled lookups with latest-position coalescing.
//! - **Selection**: single-node toggle semantics.
//! - **Camera handoff**: disables the [`OrbitControl`] while a node is dragged.
//! - **Dispatch**: per-kind and wildcard listeners with failure isolation.

pub mod config;
pub mod controller;
pub mod event;
pub mod orbit;
pub mod state;
pub mod throttle;

pub use config::ControllerConfig;
pub use controller::{HitLookup, ManipulationController};
pub use event::{InteractionEvent, InteractionKind};
pub use orbit::OrbitControl;
pub use state::InteractionState;
pub use throttle::HoverThrottle;
