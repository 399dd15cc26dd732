#![forbid(unsafe_code)]

//! Hover, select and drag for large node-link graphs.
//!
//! # Role in nodegrip
//! `nodegrip` is the public facade. It re-exports the component crates and
//! adds what a host needs to use them together:
//!
//! - [`GraphInteraction`]: the session wiring raw input through the
//!   [`ManipulationController`] into the [`DragCoordinator`], with the
//!   [`HitTester`] answering "which node is under the cursor".
//! - [`InteractionConfig`]: every tunable in one struct, loadable from TOML
//!   or JSON with the `config` feature.
//! - [`Error`]: the top-level error type.
//!
//! # Example
//!
//! ```
//! use nodegrip::prelude::*;
//! use web_time::Instant;
//!
//! let positions = [Vec3::new(50.0, 50.0, 0.0)];
//! let mut store = VecNodeStore::new(positions.to_vec());
//! let mut session = GraphInteraction::software(InteractionConfig::default())?;
//! session.set_camera(Camera::screen_space(Viewport::new(200.0, 200.0)));
//! session.assign_colors(positions.len())?;
//! session.sync_instances(&InstanceSnapshot::from_positions(&positions, 4.0));
//!
//! let t = Instant::now();
//! session.handle(&mut store, &PointerEvent::down(50.0, 50.0).into(), t);
//! session.handle(&mut store, &PointerEvent::moved(80.0, 50.0).into(), t);
//! assert!(session.controller().is_dragging());
//! assert!(store.fixed(NodeIndex::new(0)).is_some());
//! # Ok::<(), nodegrip::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod session;

pub use config::{ConfigError, ControllerSection, DragSection, InteractionConfig, PickSection};
pub use error::{Error, Result};
pub use session::{FrameOutput, GraphInteraction};

pub use nodegrip_core as core;
pub use nodegrip_drag as drag;
pub use nodegrip_interact as interact;
pub use nodegrip_pick as pick;

pub use nodegrip_core::{Camera, InputEvent, NodeIndex, NodeRecord, Vec2, Vec3, Viewport};
pub use nodegrip_drag::{
    DragConfig, DragCoordinator, DragEvent, DragEventKind, NodeStore, PositionAccessor,
    VecNodeStore,
};
pub use nodegrip_interact::{
    ControllerConfig, InteractionEvent, InteractionKind, InteractionState,
    ManipulationController, OrbitControl,
};
#[cfg(feature = "gpu")]
pub use nodegrip_pick::GpuPickTarget;
pub use nodegrip_pick::{
    HitTester, InstanceSnapshot, InstanceSource, PickConfig, PickError, PickTarget,
    SoftwarePickTarget,
};

/// Common imports for hosts.
pub mod prelude {
    pub use crate::{
        Camera, DragEvent, DragEventKind, GraphInteraction, InputEvent, InstanceSnapshot,
        InteractionConfig, InteractionEvent, InteractionKind, InteractionState, NodeIndex,
        NodeStore, OrbitControl, VecNodeStore, Vec3, Viewport,
    };
    pub use nodegrip_core::{KeyCode, KeyEvent, PointerEvent, TouchEvent, TouchPhase, TouchPoint, WheelEvent};
}
