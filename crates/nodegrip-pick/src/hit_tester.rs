#![forbid(unsafe_code)]

//! The hit tester: color-keyed picking over the mirrored instance scene.
//!
//! # Usage
//!
//! ```
//! use nodegrip_core::{Camera, NodeIndex, Vec3, Viewport};
//! use nodegrip_pick::{HitTester, InstanceSnapshot};
//!
//! let mut tester = HitTester::software();
//! tester.set_camera(Camera::screen_space(Viewport::new(640.0, 480.0)));
//! tester.assign_colors(2).unwrap();
//! tester.sync_instances(&InstanceSnapshot::from_positions(
//!     &[Vec3::new(100.0, 100.0, 0.0), Vec3::new(300.0, 200.0, 0.0)],
//!     6.0,
//! ));
//! assert_eq!(tester.pick(302.0, 199.0), Some(NodeIndex::new(1)));
//! assert_eq!(tester.pick(10.0, 10.0), None);
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | No camera | `set_camera` never called | `pick` returns `None` |
//! | Outside viewport | Cursor left the canvas | `pick` returns `None` |
//! | Readback unavailable | Headless host / lost context | `None`, or nearest fallback when enabled |
//! | Unregistered color | Stale scene after `assign_colors` | `None` |
//! | Capacity | More than 2^24 - 1 nodes | `assign_colors` errors; old mapping kept |

use nodegrip_core::{Camera, NodeIndex, Vec3};
use tracing::{debug, debug_span, warn};

use crate::color_key::ColorKey;
use crate::color_map::PickColorMap;
use crate::error::PickError;
use crate::instances::InstanceSource;
use crate::nearest::pick_nearest_in_world_space;
use crate::scene::OffscreenScene;
use crate::target::{PickTarget, SoftwarePickTarget};

/// Hit tester tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickConfig {
    /// Answer with the world-space nearest node when the target cannot read
    /// pixels back.
    pub fallback_to_nearest: bool,
    /// World-space radius for the fallback search.
    pub fallback_tolerance: f32,
    /// World plane the cursor is unprojected onto for the fallback search.
    pub fallback_plane_z: f32,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self {
            fallback_to_nearest: false,
            fallback_tolerance: 10.0,
            fallback_plane_z: 0.0,
        }
    }
}

impl PickConfig {
    /// Human-readable problems with this configuration.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(self.fallback_tolerance.is_finite() && self.fallback_tolerance >= 0.0) {
            problems.push(format!(
                "pick.fallback_tolerance must be a finite non-negative number, got {}",
                self.fallback_tolerance
            ));
        }
        if !self.fallback_plane_z.is_finite() {
            problems.push(format!(
                "pick.fallback_plane_z must be finite, got {}",
                self.fallback_plane_z
            ));
        }
        problems
    }
}

/// Pick counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PickStats {
    /// Picks requested.
    pub issued: u64,
    /// Picks that resolved to a node.
    pub hits: u64,
    /// Picks that resolved to nothing (background, out of viewport, no camera).
    pub misses: u64,
    /// Picks whose target could not read back.
    pub readback_failures: u64,
    /// Picks answered by the world-space fallback.
    pub fallbacks: u64,
}

impl PickStats {
    /// Fraction of issued picks that hit a node.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        if self.issued > 0 {
            self.hits as f64 / self.issued as f64
        } else {
            0.0
        }
    }
}

/// Color-keyed hit tester.
pub struct HitTester {
    map: PickColorMap,
    scene: OffscreenScene,
    target: Box<dyn PickTarget>,
    camera: Option<Camera>,
    config: PickConfig,
    stats: PickStats,
}

impl std::fmt::Debug for HitTester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitTester")
            .field("nodes", &self.map.len())
            .field("instances", &self.scene.instance_count())
            .field("camera", &self.camera.is_some())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish()
    }
}

impl HitTester {
    /// Create a hit tester that renders through `target`.
    #[must_use]
    pub fn new(target: impl PickTarget + 'static) -> Self {
        Self::with_config(target, PickConfig::default())
    }

    /// Create a hit tester with explicit tuning.
    #[must_use]
    pub fn with_config(target: impl PickTarget + 'static, config: PickConfig) -> Self {
        Self {
            map: PickColorMap::new(),
            scene: OffscreenScene::new(),
            target: Box::new(target),
            camera: None,
            config,
            stats: PickStats::default(),
        }
    }

    /// Hit tester backed by the CPU rasterizer.
    #[must_use]
    pub fn software() -> Self {
        Self::new(SoftwarePickTarget::new())
    }

    /// Hit tester rendering on a headless GPU device of its own.
    #[cfg(feature = "gpu")]
    pub fn gpu() -> Result<Self, PickError> {
        Ok(Self::new(crate::gpu::GpuPickTarget::new()?))
    }

    /// Current tuning.
    #[must_use]
    pub fn config(&self) -> &PickConfig {
        &self.config
    }

    /// Replace the tuning.
    pub fn set_config(&mut self, config: PickConfig) {
        self.config = config;
    }

    /// Set the camera picks are rendered from.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    /// Active camera, if any.
    #[must_use]
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Regenerate the index↔color mapping for `node_count` nodes.
    ///
    /// The offscreen scene keeps its previous colors until the next
    /// [`sync_instances`](Self::sync_instances); picks in between decode
    /// against the new table, so stale colors resolve to nothing.
    pub fn assign_colors(&mut self, node_count: usize) -> Result<(), PickError> {
        match self.map.assign(node_count) {
            Ok(()) => {
                debug!(
                    nodes = node_count,
                    generation = self.map.generation(),
                    "pick colors assigned"
                );
                Ok(())
            }
            Err(err) => {
                warn!(requested = node_count, error = %err, "pick color assignment rejected");
                Err(err)
            }
        }
    }

    /// Mirror instance transforms and pick colors from the visible scene.
    ///
    /// Returns the number of instances mirrored.
    pub fn sync_instances<S: InstanceSource + ?Sized>(&mut self, source: &S) -> usize {
        self.scene.sync(source, &self.map)
    }

    /// Node under screen point `(x, y)`.
    pub fn pick(&mut self, x: f32, y: f32) -> Option<NodeIndex> {
        let _span = debug_span!("pick", x, y).entered();
        self.stats.issued += 1;

        let picked = match self.try_pick(x, y) {
            Ok(picked) => picked,
            Err(PickError::ReadbackUnavailable(reason)) => {
                self.stats.readback_failures += 1;
                debug!(%reason, "pick readback unavailable");
                if self.config.fallback_to_nearest {
                    self.stats.fallbacks += 1;
                    self.fallback_pick(x, y)
                } else {
                    None
                }
            }
            Err(err) => {
                debug!(error = %err, "pick skipped");
                None
            }
        };

        match picked {
            Some(node) => {
                self.stats.hits += 1;
                debug!(node = node.get(), "pick hit");
            }
            None => self.stats.misses += 1,
        }
        picked
    }

    /// Render and decode one pixel without fallback or stats.
    ///
    /// `Ok(None)` means background, an unregistered color, or a point outside
    /// the viewport.
    pub fn try_pick(&mut self, x: f32, y: f32) -> Result<Option<NodeIndex>, PickError> {
        let camera = self
            .camera
            .filter(|camera| !camera.viewport().is_empty())
            .ok_or(PickError::NoCamera)?;
        if !camera.viewport().contains(x, y) {
            return Ok(None);
        }
        let rgba = self.target.render_pixel(&self.scene, &camera, x, y)?;
        Ok(self.map.index_of(ColorKey::from_rgba8(rgba)))
    }

    /// World-space nearest node to `world_point` among mirrored instances.
    #[must_use]
    pub fn pick_nearest(&self, world_point: Vec3, tolerance: f32) -> Option<NodeIndex> {
        pick_nearest_in_world_space(world_point, self.scene.positions(), self.map.len(), tolerance)
    }

    fn fallback_pick(&self, x: f32, y: f32) -> Option<NodeIndex> {
        let camera = self.camera.as_ref()?;
        if !camera.viewport().contains(x, y) {
            return None;
        }
        let world = camera.unproject_on_plane(x, y, self.config.fallback_plane_z);
        self.pick_nearest(world, self.config.fallback_tolerance)
    }

    /// Color issued to `index`.
    #[must_use]
    pub fn color_of(&self, index: NodeIndex) -> Option<ColorKey> {
        self.map.color_of(index)
    }

    /// Node owning `color`.
    #[must_use]
    pub fn index_of(&self, color: ColorKey) -> Option<NodeIndex> {
        self.map.index_of(color)
    }

    /// Nodes in the current assignment.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.map.len()
    }

    /// The mirrored offscreen scene.
    #[must_use]
    pub fn scene(&self) -> &OffscreenScene {
        &self.scene
    }

    /// Pick counters.
    #[must_use]
    pub fn stats(&self) -> PickStats {
        self.stats
    }

    /// Zero the pick counters.
    pub fn reset_stats(&mut self) {
        self.stats = PickStats::default();
    }

    /// Release the mapping, the mirrored scene and target resources.
    pub fn dispose(&mut self) {
        // Reassigning zero nodes cannot exceed capacity.
        let _ = self.map.assign(0);
        self.scene.clear();
        self.target.dispose();
        self.camera = None;
        debug!("hit tester disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_key::MAX_PICKABLE_NODES;
    use crate::instances::InstanceSnapshot;
    use crate::target::HeadlessPickTarget;
    use nodegrip_core::Viewport;

    fn tester_with(points: &[Vec3]) -> HitTester {
        let mut tester = HitTester::software();
        tester.set_camera(Camera::screen_space(Viewport::new(400.0, 300.0)));
        tester.assign_colors(points.len()).unwrap();
        tester.sync_instances(&InstanceSnapshot::from_positions(points, 5.0));
        tester
    }

    #[test]
    fn picks_node_under_cursor() {
        let mut tester = tester_with(&[Vec3::new(40.0, 40.0, 0.0), Vec3::new(200.0, 100.0, 0.0)]);
        assert_eq!(tester.pick(41.0, 39.0), Some(NodeIndex::new(0)));
        assert_eq!(tester.pick(200.0, 100.0), Some(NodeIndex::new(1)));
        assert_eq!(tester.pick(120.0, 250.0), None);
        let stats = tester.stats();
        assert_eq!(stats.issued, 3);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn reset_stats_zeroes_counters() {
        let mut tester = tester_with(&[Vec3::new(40.0, 40.0, 0.0)]);
        tester.pick(40.0, 40.0);
        tester.pick(300.0, 200.0);
        assert_eq!(tester.stats().hit_rate(), 0.5);
        tester.reset_stats();
        assert_eq!(tester.stats(), PickStats::default());
        assert_eq!(tester.stats().hit_rate(), 0.0);
        // Counting resumes from zero.
        tester.pick(40.0, 40.0);
        assert_eq!(tester.stats().issued, 1);
        assert_eq!(tester.stats().hit_rate(), 1.0);
    }

    #[cfg(feature = "gpu")]
    #[test]
    fn gpu_tester_matches_software() {
        let Ok(mut gpu) = HitTester::gpu() else { return };
        let points = [Vec3::new(40.0, 40.0, 0.0), Vec3::new(200.0, 100.0, 0.0)];
        gpu.set_camera(Camera::screen_space(Viewport::new(400.0, 300.0)));
        gpu.assign_colors(points.len()).unwrap();
        gpu.sync_instances(&InstanceSnapshot::from_positions(&points, 5.0));
        let mut cpu = tester_with(&points);
        for (x, y) in [(41.0, 39.0), (200.0, 100.0), (120.0, 250.0)] {
            assert_eq!(gpu.pick(x, y), cpu.pick(x, y), "at ({x}, {y})");
        }
        assert_eq!(gpu.stats(), cpu.stats());
    }

    #[test]
    fn outside_viewport_is_none() {
        let mut tester = tester_with(&[Vec3::new(0.0, 0.0, 0.0)]);
        assert_eq!(tester.pick(-1.0, 0.0), None);
        assert_eq!(tester.pick(0.0, 301.0), None);
    }

    #[test]
    fn no_camera_is_none() {
        let mut tester = HitTester::software();
        tester.assign_colors(1).unwrap();
        assert_eq!(tester.pick(0.0, 0.0), None);
        assert!(matches!(tester.try_pick(0.0, 0.0), Err(PickError::NoCamera)));
    }

    #[test]
    fn reassignment_without_sync_invalidates_stale_colors() {
        let mut tester = tester_with(&[Vec3::new(10.0, 10.0, 0.0), Vec3::new(50.0, 50.0, 0.0)]);
        tester.assign_colors(1).unwrap();
        // Node 1 is still drawn with its old color but that color is gone.
        assert_eq!(tester.pick(50.0, 50.0), None);
        assert_eq!(tester.pick(10.0, 10.0), Some(NodeIndex::new(0)));
    }

    #[test]
    fn capacity_error_keeps_mapping() {
        let mut tester = tester_with(&[Vec3::new(10.0, 10.0, 0.0)]);
        let err = tester
            .assign_colors(MAX_PICKABLE_NODES as usize + 1)
            .unwrap_err();
        assert_eq!(
            err,
            PickError::CapacityExceeded {
                requested: MAX_PICKABLE_NODES as usize + 1,
                max: MAX_PICKABLE_NODES,
            }
        );
        assert_eq!(tester.node_count(), 1);
        assert_eq!(tester.pick(10.0, 10.0), Some(NodeIndex::new(0)));
    }

    #[test]
    fn headless_target_returns_none_by_default() {
        let mut tester = HitTester::new(HeadlessPickTarget);
        tester.set_camera(Camera::screen_space(Viewport::new(100.0, 100.0)));
        tester.assign_colors(1).unwrap();
        tester.sync_instances(&InstanceSnapshot::from_positions(&[Vec3::new(5.0, 5.0, 0.0)], 2.0));
        assert_eq!(tester.pick(5.0, 5.0), None);
        assert_eq!(tester.stats().readback_failures, 1);
        assert_eq!(tester.stats().fallbacks, 0);
    }

    #[test]
    fn headless_target_can_fall_back_to_nearest() {
        let config = PickConfig {
            fallback_to_nearest: true,
            fallback_tolerance: 4.0,
            fallback_plane_z: 0.0,
        };
        let mut tester = HitTester::with_config(HeadlessPickTarget, config);
        tester.set_camera(Camera::screen_space(Viewport::new(100.0, 100.0)));
        tester.assign_colors(2).unwrap();
        tester.sync_instances(&InstanceSnapshot::from_positions(
            &[Vec3::new(5.0, 5.0, 0.0), Vec3::new(50.0, 50.0, 0.0)],
            2.0,
        ));
        assert_eq!(tester.pick(52.0, 51.0), Some(NodeIndex::new(1)));
        assert_eq!(tester.pick(80.0, 80.0), None);
        assert_eq!(tester.stats().fallbacks, 2);
    }

    #[test]
    fn dispose_clears_everything() {
        let mut tester = tester_with(&[Vec3::new(10.0, 10.0, 0.0)]);
        tester.dispose();
        assert_eq!(tester.node_count(), 0);
        assert_eq!(tester.scene().instance_count(), 0);
        assert_eq!(tester.pick(10.0, 10.0), None);
    }

    #[test]
    fn config_validation() {
        assert!(PickConfig::default().validate().is_empty());
        let bad = PickConfig {
            fallback_tolerance: -1.0,
            fallback_plane_z: f32::INFINITY,
            ..PickConfig::default()
        };
        assert_eq!(bad.validate().len(), 2);
    }
}
