#![forbid(unsafe_code)]

//! Camera orbit collaborator.

/// The host's camera controls (orbit, pan, zoom).
///
/// The controller disables it while a node is dragged so the camera does not
/// move under the cursor, and forwards wheel input to it.
pub trait OrbitControl {
    /// Enable or disable camera rotation/panning from pointer input.
    fn set_enabled(&mut self, enabled: bool);

    /// Apply a wheel zoom step at screen point `(x, y)`.
    fn zoom(&mut self, delta: f32, x: f32, y: f32) {
        let _ = (delta, x, y);
    }
}
