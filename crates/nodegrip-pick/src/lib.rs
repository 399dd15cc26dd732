#![forbid(unsafe_code)]

//! Picking: which node, if any, is under a screen coordinate.
//!
//! # Role in nodegrip
//! `nodegrip-pick` is the leaf hit tester. Every node instance is assigned a
//! unique flat [`ColorKey`]; an invisible copy of the visible scene is drawn
//! with those colors into a 1×1 offscreen buffer aimed at the cursor, and the
//! sampled color decodes back to a [`NodeIndex`](nodegrip_core::NodeIndex).
//! Cost per pick is one render pass plus one pixel of readback, independent
//! of how many nodes the graph has.
//!
//! # Primary responsibilities
//! - **ColorKey / PickColorMap**: the bijective index↔color mapping, with
//!   black reserved for the background.
//! - **OffscreenScene**: mirrored instance transforms and per-instance pick
//!   colors, refreshed by [`HitTester::sync_instances`].
//! - **PickTarget**: the render + readback seam. `GpuPickTarget` (feature
//!   `gpu`) draws the scene as one instanced pass with `wgpu`;
//!   [`SoftwarePickTarget`] is the O(N) CPU rasterizer for headless hosts
//!   and tests.
//! - **Nearest-neighbor fallback**: an O(N) world-space search for hosts
//!   without readback support.

pub mod buffer;
pub mod color_key;
pub mod color_map;
pub mod error;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod hit_tester;
pub mod instances;
pub mod nearest;
pub mod scene;
pub mod target;

pub use buffer::PickBuffer;
pub use color_key::{BACKGROUND, ColorKey, MAX_PICKABLE_NODES};
pub use color_map::PickColorMap;
pub use error::PickError;
#[cfg(feature = "gpu")]
pub use gpu::GpuPickTarget;
pub use hit_tester::{HitTester, PickConfig, PickStats};
pub use instances::{GroupKey, InstanceBatch, InstanceSnapshot, InstanceSource, InstanceTransform};
pub use nearest::pick_nearest_in_world_space;
pub use scene::{OffscreenGroup, OffscreenScene};
pub use target::{HeadlessPickTarget, PickTarget, SoftwarePickTarget};
