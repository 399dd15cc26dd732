#![forbid(unsafe_code)]

//! Render targets for the 1-pixel pick pass.
//!
//! A [`PickTarget`] draws an [`OffscreenScene`] through the camera's
//! off-axis pick projection (see [`Camera::pick_projection`]) into a 1×1
//! color buffer and reads that pixel back.

use nodegrip_core::{Camera, Mat4, Vec3};
use tracing::trace;

use crate::buffer::PickBuffer;
use crate::error::PickError;
use crate::scene::OffscreenScene;

/// Render + readback of the single pick pixel.
pub trait PickTarget {
    /// Render `scene` so that only screen pixel `(x, y)` is rasterized and
    /// return its RGBA value. The background must read back as black.
    fn render_pixel(
        &mut self,
        scene: &OffscreenScene,
        camera: &Camera,
        x: f32,
        y: f32,
    ) -> Result<[u8; 4], PickError>;

    /// Release GPU or CPU resources held by the target.
    fn dispose(&mut self) {}
}

/// CPU rasterizer for the pick pass.
///
/// Every instance is treated as a camera-facing disc of radius
/// [`InstanceTransform::radius`](crate::InstanceTransform::radius). A disc
/// covers the pick pixel when the pixel center lies inside its projected
/// footprint; the nearest covering disc wins.
///
/// Each render projects every instance, so a pick costs O(N). Use it for
/// headless hosts and tests; interactive graphs enable the `gpu` feature
/// and pick through `GpuPickTarget`, which produces the same pixels.
#[derive(Debug, Clone)]
pub struct SoftwarePickTarget {
    buffer: PickBuffer,
}

impl SoftwarePickTarget {
    /// Create a target with its own 1×1 buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: PickBuffer::new(1, 1),
        }
    }

    /// The buffer written by the last render.
    #[must_use]
    pub fn buffer(&self) -> &PickBuffer {
        &self.buffer
    }
}

impl Default for SoftwarePickTarget {
    fn default() -> Self {
        Self::new()
    }
}

/// Project `world` through `matrix` into normalized device coordinates.
fn to_ndc(matrix: &Mat4, world: Vec3) -> Option<Vec3> {
    let clip = *matrix * world.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    Some(clip.truncate() / clip.w)
}

impl PickTarget for SoftwarePickTarget {
    fn render_pixel(
        &mut self,
        scene: &OffscreenScene,
        camera: &Camera,
        x: f32,
        y: f32,
    ) -> Result<[u8; 4], PickError> {
        self.buffer.clear();
        let matrix = camera.pick_projection(x, y) * camera.view();
        let right = camera.right();

        let mut drawn = 0usize;
        for group in scene.groups() {
            for (_, transform, color) in group.instances() {
                let Some(center) = to_ndc(&matrix, transform.position) else {
                    continue;
                };
                if !(0.0..=1.0).contains(&center.z) {
                    continue;
                }
                let edge_world = transform.position + right * transform.radius();
                let Some(edge) = to_ndc(&matrix, edge_world) else {
                    continue;
                };
                // Pick-space NDC is isotropic: two units per screen pixel.
                let radius = (edge.truncate() - center.truncate()).length();
                if center.truncate().length() <= radius
                    && self.buffer.write_if_nearer(0, 0, color, center.z)
                {
                    drawn += 1;
                }
            }
        }
        trace!(x, y, drawn, "software pick pass");

        self.buffer
            .read_rgba8(0, 0)
            .ok_or_else(|| PickError::ReadbackUnavailable("pick buffer is empty".to_owned()))
    }

    fn dispose(&mut self) {
        self.buffer.clear();
    }
}

/// Target for hosts without a readable render context.
///
/// Every render reports [`PickError::ReadbackUnavailable`], which makes the
/// hit tester answer `None` (or use the world-space fallback when enabled).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessPickTarget;

impl PickTarget for HeadlessPickTarget {
    fn render_pixel(
        &mut self,
        _scene: &OffscreenScene,
        _camera: &Camera,
        _x: f32,
        _y: f32,
    ) -> Result<[u8; 4], PickError> {
        Err(PickError::ReadbackUnavailable(
            "no graphics context".to_owned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_key::ColorKey;
    use crate::color_map::PickColorMap;
    use crate::instances::{GroupKey, InstanceSnapshot, InstanceTransform};
    use nodegrip_core::{NodeIndex, Viewport};

    fn scene_with(snapshot: &InstanceSnapshot, count: usize) -> (OffscreenScene, PickColorMap) {
        let mut map = PickColorMap::new();
        map.assign(count).unwrap();
        let mut scene = OffscreenScene::new();
        scene.sync(snapshot, &map);
        (scene, map)
    }

    fn camera() -> Camera {
        Camera::screen_space(Viewport::new(200.0, 100.0))
    }

    #[test]
    fn empty_scene_reads_background() {
        let mut target = SoftwarePickTarget::new();
        let rgba = target
            .render_pixel(&OffscreenScene::new(), &camera(), 10.0, 10.0)
            .unwrap();
        assert!(ColorKey::from_rgba8(rgba).is_background());
    }

    #[test]
    fn disc_covers_nearby_pixels() {
        let snap = InstanceSnapshot::from_positions(&[Vec3::new(50.0, 50.0, 0.0)], 5.0);
        let (scene, map) = scene_with(&snap, 1);
        let mut target = SoftwarePickTarget::new();
        let hit = target.render_pixel(&scene, &camera(), 53.0, 50.0).unwrap();
        assert_eq!(
            map.index_of(ColorKey::from_rgba8(hit)),
            Some(NodeIndex::new(0))
        );
        let miss = target.render_pixel(&scene, &camera(), 60.0, 50.0).unwrap();
        assert!(ColorKey::from_rgba8(miss).is_background());
    }

    #[test]
    fn nearer_instance_wins() {
        // Screen-space camera looks down -z; larger z is nearer.
        let mut snap = InstanceSnapshot::new();
        snap.push(
            GroupKey(0),
            NodeIndex::new(0),
            InstanceTransform::new(Vec3::new(20.0, 20.0, -10.0), 4.0),
        );
        snap.push(
            GroupKey(1),
            NodeIndex::new(1),
            InstanceTransform::new(Vec3::new(20.0, 20.0, 10.0), 4.0),
        );
        let (scene, map) = scene_with(&snap, 2);
        let mut target = SoftwarePickTarget::new();
        let rgba = target.render_pixel(&scene, &camera(), 20.0, 20.0).unwrap();
        assert_eq!(
            map.index_of(ColorKey::from_rgba8(rgba)),
            Some(NodeIndex::new(1))
        );
    }

    #[test]
    fn headless_reports_unavailable() {
        let mut target = HeadlessPickTarget;
        let err = target
            .render_pixel(&OffscreenScene::new(), &camera(), 0.0, 0.0)
            .unwrap_err();
        assert!(matches!(err, PickError::ReadbackUnavailable(_)));
    }
}
