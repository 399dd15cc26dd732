#![forbid(unsafe_code)]

//! Picking errors.

use thiserror::Error;

/// Errors from the hit tester and its render targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickError {
    /// More nodes were requested than 24-bit colors can address.
    #[error("cannot assign pick colors to {requested} nodes (max {max})")]
    CapacityExceeded { requested: usize, max: u32 },

    /// The render target cannot read pixels back (no graphics context,
    /// software rendering without readback, lost device).
    #[error("pick readback unavailable: {0}")]
    ReadbackUnavailable(String),

    /// No camera has been set, or the camera viewport has zero area.
    #[error("no usable camera for picking")]
    NoCamera,
}
