#![forbid(unsafe_code)]

//! Camera projection between world space and screen space.
//!
//! A [`Camera`] pairs view and projection matrices with the viewport they
//! render into. The hit tester uses [`Camera::pick_projection`] to restrict
//! rendering to the single pixel under the cursor, and the manipulation
//! controller uses [`Camera::unproject_on_plane`] to report world-space
//! cursor positions.
//!
//! Depth follows the `glam` right-handed convention: normalized device depth
//! lies in `[0, 1]`, smaller is nearer.

use glam::{Mat4, Vec2, Vec3};

use crate::geometry::Viewport;

/// Near/far extent used by [`Camera::screen_space`].
const SCREEN_SPACE_DEPTH: f32 = 1000.0;

/// View + projection + viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    view: Mat4,
    projection: Mat4,
    viewport: Viewport,
}

impl Camera {
    /// Create a camera from explicit matrices.
    #[must_use]
    pub const fn new(view: Mat4, projection: Mat4, viewport: Viewport) -> Self {
        Self {
            view,
            projection,
            viewport,
        }
    }

    /// Orthographic camera whose world x/y equal screen pixels.
    ///
    /// World `(x, y, 0)` projects to screen `(x, y)`. Useful for 2D graph
    /// views and for tests.
    #[must_use]
    pub fn screen_space(viewport: Viewport) -> Self {
        let projection = Mat4::orthographic_rh(
            0.0,
            viewport.width,
            viewport.height,
            0.0,
            -SCREEN_SPACE_DEPTH,
            SCREEN_SPACE_DEPTH,
        );
        Self::new(Mat4::IDENTITY, projection, viewport)
    }

    /// Perspective camera looking from `eye` towards `target`.
    #[must_use]
    pub fn perspective(
        viewport: Viewport,
        fov_y_radians: f32,
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        near: f32,
        far: f32,
    ) -> Self {
        let aspect = if viewport.height > 0.0 {
            viewport.width / viewport.height
        } else {
            1.0
        };
        let projection = Mat4::perspective_rh(fov_y_radians, aspect, near, far);
        let view = Mat4::look_at_rh(eye, target, up);
        Self::new(view, projection, viewport)
    }

    /// View matrix.
    #[inline]
    #[must_use]
    pub const fn view(&self) -> Mat4 {
        self.view
    }

    /// Projection matrix.
    #[inline]
    #[must_use]
    pub const fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Viewport the camera renders into.
    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize the viewport, keeping the matrices.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Replace the view matrix (orbit controls move the camera).
    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    /// Combined projection * view.
    #[inline]
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Camera right axis in world space.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.view.inverse().x_axis.truncate().normalize_or_zero()
    }

    /// Camera up axis in world space.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.view.inverse().y_axis.truncate().normalize_or_zero()
    }

    /// Project a world point to `(screen, depth)`.
    ///
    /// Returns `None` for points behind the camera.
    #[must_use]
    pub fn project(&self, world: Vec3) -> Option<(Vec2, f32)> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some((self.viewport.from_ndc(ndc.truncate()), ndc.z))
    }

    /// Unproject a screen point at normalized depth `depth` (`0` = near plane,
    /// `1` = far plane).
    #[must_use]
    pub fn unproject(&self, x: f32, y: f32, depth: f32) -> Vec3 {
        let ndc = self.viewport.to_ndc(x, y);
        self.view_projection()
            .inverse()
            .project_point3(Vec3::new(ndc.x, ndc.y, depth))
    }

    /// World-space ray through a screen point: `(origin on near plane, unit
    /// direction)`.
    #[must_use]
    pub fn ray(&self, x: f32, y: f32) -> (Vec3, Vec3) {
        let near = self.unproject(x, y, 0.0);
        let far = self.unproject(x, y, 1.0);
        (near, (far - near).normalize_or_zero())
    }

    /// Intersect the ray through `(x, y)` with the world plane `z = plane_z`.
    ///
    /// A ray parallel to the plane falls back to the near-plane point with its
    /// z replaced by `plane_z`.
    #[must_use]
    pub fn unproject_on_plane(&self, x: f32, y: f32, plane_z: f32) -> Vec3 {
        let (origin, dir) = self.ray(x, y);
        if dir.z.abs() <= f32::EPSILON {
            return Vec3::new(origin.x, origin.y, plane_z);
        }
        let t = (plane_z - origin.z) / dir.z;
        origin + dir * t
    }

    /// Off-axis projection that maps the single pixel around `(x, y)` onto
    /// the whole of normalized device space.
    ///
    /// Rendering with `pick_projection(x, y) * view` into a 1×1 target is
    /// equivalent to rendering the full viewport and reading the pixel at
    /// `(x, y)`. A point projects inside `[-1, 1]²` exactly when it lands in
    /// that pixel; one NDC unit corresponds to half a screen pixel.
    #[must_use]
    pub fn pick_projection(&self, x: f32, y: f32) -> Mat4 {
        let center = self.viewport.to_ndc(x, y);
        let scale = Mat4::from_scale(Vec3::new(self.viewport.width, self.viewport.height, 1.0));
        let shift = Mat4::from_translation(Vec3::new(-center.x, -center.y, 0.0));
        scale * shift * self.projection
    }
}
